use crate::Result;
use crate::error::StagehandError;
use crate::output::LogSink;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A host entry as written in the YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSpec {
    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,
}

/// A target host, handed through to every test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub platform: Option<String>,
    pub roles: Vec<String>,
}

/// Host configuration file:
///
/// ```yaml
/// HOSTS:
///   master: { platform: el-6-x86_64, roles: [master, agent] }
/// CONFIG:
///   consoleport: 443
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(rename = "HOSTS", default)]
    pub hosts: BTreeMap<String, HostSpec>,

    #[serde(rename = "CONFIG", default)]
    pub config: BTreeMap<String, Value>,

    /// File this configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl HostConfig {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StagehandError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config: HostConfig = serde_yaml::from_str(&content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Hosts ordered by name
    pub fn hosts(&self) -> Vec<Host> {
        self.hosts
            .iter()
            .map(|(name, spec)| Host {
                name: name.clone(),
                platform: spec.platform.clone(),
                roles: spec.roles.clone(),
            })
            .collect()
    }

    /// Log a readable dump of the hosts and the free-form settings.
    pub fn dump(&self, sink: &mut LogSink) {
        sink.notify("  HOSTS:");
        for host in self.hosts() {
            let platform = host.platform.as_deref().unwrap_or("unknown platform");
            sink.notify(format!(
                "    {} ({}) roles: {}",
                host.name,
                platform,
                host.roles.join(", ")
            ));
        }

        sink.notify("  CONFIG:");
        for (key, value) in &self.config {
            sink.notify(format!("    {}: {}", key, render_value(value)));
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().replace('\n', "; "))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
HOSTS:
  master:
    platform: el-6-x86_64
    roles: [master, agent]
  agent1:
    platform: ubuntu-10.04-amd64
    roles: [agent]
CONFIG:
  consoleport: 443
  modulepath: /opt/puppet/modules
"#;

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hosts.yml");
        fs::write(&path, SAMPLE).unwrap();

        let config = HostConfig::load_from_path(&path).unwrap();
        assert_eq!(config.source.as_deref(), Some(path.as_path()));

        let hosts = config.hosts();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].name, "agent1");
        assert_eq!(hosts[1].roles, vec!["master".to_string(), "agent".to_string()]);
        assert_eq!(render_value(&config.config["consoleport"]), "443");
    }

    #[test]
    fn test_dump_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("dump.txt");
        let config: HostConfig = serde_yaml::from_str(SAMPLE).unwrap();

        let mut sink = LogSink::new(false, false);
        sink.set_file(Some(&log)).unwrap();
        config.dump(&mut sink);

        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains("    master (el-6-x86_64) roles: master, agent"));
        assert!(content.contains("    modulepath: /opt/puppet/modules"));
    }

    #[test]
    fn test_empty_document_sections_default() {
        let config: HostConfig = serde_yaml::from_str("CONFIG:\n  a: 1\n").unwrap();
        assert!(config.hosts().is_empty());
    }

    #[test]
    fn test_malformed_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yml");
        fs::write(&path, "HOSTS: [unclosed").unwrap();
        assert!(matches!(
            HostConfig::load_from_path(&path),
            Err(StagehandError::YamlError(_))
        ));
    }
}
