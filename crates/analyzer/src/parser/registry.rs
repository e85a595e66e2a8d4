use crate::parser::formats::{
    ApacheAccessParser, ApacheErrorParser, DockerParser, GenericParser, JavaParser, JsonlParser,
    KubernetesParser, PythonParser, SyslogParser,
};
use crate::parser::model::LogFormat;
use crate::parser::traits::LogParser;

/// One named slot in the parser table.
pub struct Registered {
    pub name: &'static str,
    pub format: LogFormat,
    pub parser: &'static dyn LogParser,
}

// Order matters! More specific formats come first so that equal detection
// scores resolve toward the stricter parser; generic is last on purpose.
pub const REGISTRY: &[Registered] = &[
    Registered {
        name: "syslog",
        format: LogFormat::Syslog,
        parser: &SyslogParser,
    },
    Registered {
        name: "apache_access",
        format: LogFormat::ApacheAccess,
        parser: &ApacheAccessParser,
    },
    Registered {
        name: "apache_error",
        format: LogFormat::ApacheError,
        parser: &ApacheErrorParser,
    },
    Registered {
        name: "jsonl",
        format: LogFormat::Jsonl,
        parser: &JsonlParser,
    },
    Registered {
        name: "docker",
        format: LogFormat::Docker,
        parser: &DockerParser,
    },
    Registered {
        name: "python",
        format: LogFormat::Python,
        parser: &PythonParser,
    },
    Registered {
        name: "java",
        format: LogFormat::Java,
        parser: &JavaParser,
    },
    Registered {
        name: "kubernetes",
        format: LogFormat::Kubernetes,
        parser: &KubernetesParser,
    },
    Registered {
        name: "generic",
        format: LogFormat::Generic,
        parser: &GenericParser,
    },
];

/// Parser for a known format. Total: every `LogFormat` variant has a slot.
pub fn parser_for(format: LogFormat) -> &'static dyn LogParser {
    REGISTRY
        .iter()
        .find(|slot| slot.format == format)
        .map(|slot| slot.parser)
        .unwrap_or(&GenericParser)
}

/// Parser for a caller-supplied name; unknown names fall back to generic.
pub fn parser_by_name(name: &str) -> &'static dyn LogParser {
    match LogFormat::from_name(name) {
        Some(format) => parser_for(format),
        None => &GenericParser,
    }
}
