use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::failure::FailurePolicy;

/// A message transport (queue) consumed by the workers of one Supervisor program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transport {
    pub name: String,
    pub program: String,
    pub failure: FailurePolicy,
}

impl Transport {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            failure: FailurePolicy::default(),
        }
    }

    pub fn with_failure(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    fn from_raw(name: String, raw: TransportRaw) -> Self {
        match raw {
            TransportRaw::Program(program) => Self::new(name, program),
            TransportRaw::Detailed { program, failure } => {
                Self::new(name, program).with_failure(failure)
            }
        }
    }
}

// A transport entry is either the bare program name or a full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TransportRaw {
    Program(String),
    Detailed {
        program: String,
        #[serde(default)]
        failure: FailurePolicy,
    },
}

/// Transports in configuration order. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportRegistry {
    transports: Vec<Transport>,
}

impl TransportRegistry {
    pub fn new(transports: Vec<Transport>) -> crate::Result<Self> {
        let mut seen = HashSet::with_capacity(transports.len());
        for transport in &transports {
            if transport.program.trim().is_empty() {
                return Err(crate::Error::Config(format!(
                    "Transport {} has an empty program",
                    transport.name
                )));
            }
            if !seen.insert(transport.name.as_str()) {
                return Err(crate::Error::Config(format!(
                    "Transport {} is declared twice",
                    transport.name
                )));
            }
        }

        Ok(Self { transports })
    }

    pub fn get(&self, name: &str) -> Option<&Transport> {
        self.transports.iter().find(|t| t.name == name)
    }

    /// Distinct programs, in order of first appearance.
    pub fn programs(&self) -> Vec<&str> {
        let mut programs: Vec<&str> = Vec::new();
        for transport in &self.transports {
            if !programs.contains(&transport.program.as_str()) {
                programs.push(&transport.program);
            }
        }
        programs
    }

    pub fn transports_for_program(&self, program: &str) -> Vec<&str> {
        self.transports
            .iter()
            .filter(|t| t.program == program)
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transport> {
        self.transports.iter()
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

impl<'de> Deserialize<'de> for TransportRegistry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = Vec<Transport>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of transport names to programs")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut transports = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, raw)) = map.next_entry::<String, TransportRaw>()? {
                    transports.push(Transport::from_raw(name, raw));
                }
                Ok(transports)
            }
        }

        let transports = deserializer.deserialize_map(RegistryVisitor)?;
        TransportRegistry::new(transports).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Action;

    fn registry() -> TransportRegistry {
        TransportRegistry::new(vec![
            Transport::new("transport1", "program1"),
            Transport::new("transport2", "program2"),
            Transport::new("transport3", "program1"),
            Transport::new("transport4", "program4"),
        ])
        .unwrap()
    }

    #[test]
    fn test_programs_are_deduplicated_in_first_seen_order() {
        assert_eq!(registry().programs(), vec!["program1", "program2", "program4"]);
    }

    #[test]
    fn test_transports_for_program() {
        let registry = registry();
        assert_eq!(
            registry.transports_for_program("program1"),
            vec!["transport1", "transport3"]
        );
        assert_eq!(registry.transports_for_program("program4"), vec!["transport4"]);
        assert!(registry.transports_for_program("bad").is_empty());
    }

    #[test]
    fn test_transports_for_program_partitions_registry() {
        let registry = registry();
        let mut names: Vec<&str> = registry
            .programs()
            .into_iter()
            .flat_map(|p| registry.transports_for_program(p))
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["transport1", "transport2", "transport3", "transport4"]
        );
    }

    #[test]
    fn test_duplicate_transport_rejected() {
        let result = TransportRegistry::new(vec![
            Transport::new("transport1", "program1"),
            Transport::new("transport1", "program2"),
        ]);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_empty_program_rejected() {
        let result = TransportRegistry::new(vec![Transport::new("transport1", " ")]);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_deserialize_string_and_object_entries() {
        let json = r#"{
            "zeta": "program1",
            "alpha": {
                "program": "program2",
                "failure": { "stop_program": "will-not-retry", "send_mail": "never" }
            },
            "beta": { "program": "program1" }
        }"#;
        let registry: TransportRegistry = serde_json::from_str(json).unwrap();

        let names: Vec<&str> = registry.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "beta"]);

        let zeta = registry.get("zeta").unwrap();
        assert_eq!(zeta.program, "program1");
        assert_eq!(zeta.failure, FailurePolicy::default());

        let alpha = registry.get("alpha").unwrap();
        assert_eq!(alpha.failure.stop_program, Action::WillNotRetry);
        assert_eq!(alpha.failure.send_mail, Action::Never);

        let beta = registry.get("beta").unwrap();
        assert_eq!(beta.failure.stop_program, Action::Always);
        assert_eq!(beta.failure.send_mail, Action::Always);
    }

    #[test]
    fn test_deserialize_rejects_missing_program() {
        let json = r#"{ "transport1": { "failure": {} } }"#;
        assert!(serde_json::from_str::<TransportRegistry>(json).is_err());
    }
}
