//! Diagram languages rendered through Kroki.

/// Supported diagram languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLanguage {
    PlantUml,
    C4PlantUml,
    Mermaid,
    GraphViz,
    Ditaa,
    BlockDiag,
    SeqDiag,
    ActDiag,
    NwDiag,
    PacketDiag,
    RackDiag,
    Erd,
    Nomnoml,
    Svgbob,
    Vega,
    VegaLite,
    WaveDrom,
    Bpmn,
    Bytefield,
    D2,
    Dbml,
    Excalidraw,
    Pikchr,
    Structurizr,
    Symbolator,
    TikZ,
    Umlet,
    WireViz,
}

impl DiagramLanguage {
    /// Parse a code fence language.
    ///
    /// Accepts plain names (`mermaid`) and the `kroki-` prefixed names used by
    /// the MkDocs Kroki plugin (`kroki-mermaid`). Matching is case-insensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        let lang = lower.strip_prefix("kroki-").unwrap_or(&lower);

        let language = match lang {
            "plantuml" | "puml" => Self::PlantUml,
            "c4plantuml" => Self::C4PlantUml,
            "mermaid" => Self::Mermaid,
            "graphviz" | "dot" => Self::GraphViz,
            "ditaa" => Self::Ditaa,
            "blockdiag" => Self::BlockDiag,
            "seqdiag" => Self::SeqDiag,
            "actdiag" => Self::ActDiag,
            "nwdiag" => Self::NwDiag,
            "packetdiag" => Self::PacketDiag,
            "rackdiag" => Self::RackDiag,
            "erd" => Self::Erd,
            "nomnoml" => Self::Nomnoml,
            "svgbob" => Self::Svgbob,
            "vega" => Self::Vega,
            "vegalite" => Self::VegaLite,
            "wavedrom" => Self::WaveDrom,
            "bpmn" => Self::Bpmn,
            "bytefield" => Self::Bytefield,
            "d2" => Self::D2,
            "dbml" => Self::Dbml,
            "excalidraw" => Self::Excalidraw,
            "pikchr" => Self::Pikchr,
            "structurizr" => Self::Structurizr,
            "symbolator" => Self::Symbolator,
            "tikz" => Self::TikZ,
            "umlet" => Self::Umlet,
            "wireviz" => Self::WireViz,
            _ => return None,
        };
        Some(language)
    }

    /// Kroki endpoint name for this diagram type.
    #[must_use]
    pub fn kroki_endpoint(self) -> &'static str {
        match self {
            Self::PlantUml => "plantuml",
            Self::C4PlantUml => "c4plantuml",
            Self::Mermaid => "mermaid",
            Self::GraphViz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::BlockDiag => "blockdiag",
            Self::SeqDiag => "seqdiag",
            Self::ActDiag => "actdiag",
            Self::NwDiag => "nwdiag",
            Self::PacketDiag => "packetdiag",
            Self::RackDiag => "rackdiag",
            Self::Erd => "erd",
            Self::Nomnoml => "nomnoml",
            Self::Svgbob => "svgbob",
            Self::Vega => "vega",
            Self::VegaLite => "vegalite",
            Self::WaveDrom => "wavedrom",
            Self::Bpmn => "bpmn",
            Self::Bytefield => "bytefield",
            Self::D2 => "d2",
            Self::Dbml => "dbml",
            Self::Excalidraw => "excalidraw",
            Self::Pikchr => "pikchr",
            Self::Structurizr => "structurizr",
            Self::Symbolator => "symbolator",
            Self::TikZ => "tikz",
            Self::Umlet => "umlet",
            Self::WireViz => "wireviz",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        assert_eq!(DiagramLanguage::parse("mermaid"), Some(DiagramLanguage::Mermaid));
        assert_eq!(
            DiagramLanguage::parse("kroki-mermaid"),
            Some(DiagramLanguage::Mermaid)
        );
        assert_eq!(
            DiagramLanguage::parse("PlantUML"),
            Some(DiagramLanguage::PlantUml)
        );
    }

    #[test]
    fn test_dot_is_graphviz() {
        let lang = DiagramLanguage::parse("dot").unwrap();
        assert_eq!(lang.kroki_endpoint(), "graphviz");
    }

    #[test]
    fn test_non_diagram_languages() {
        assert_eq!(DiagramLanguage::parse("rust"), None);
        assert_eq!(DiagramLanguage::parse("kroki-"), None);
        assert_eq!(DiagramLanguage::parse(""), None);
    }

    #[test]
    fn test_endpoints_round_trip() {
        for name in ["plantuml", "c4plantuml", "d2", "structurizr", "wavedrom", "tikz"] {
            let lang = DiagramLanguage::parse(name).unwrap();
            assert_eq!(lang.kroki_endpoint(), name);
        }
    }
}
