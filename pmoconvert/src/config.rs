//! Configuration des sessions de conversion.
//!
//! La configuration par défaut est embarquée (`pmoconvert.yaml`). Un fichier
//! `pmoconvert.yaml` externe peut la compléter : les mappings sont fusionnés,
//! les scalaires remplacés. Les variables d'environnement préfixées par
//! `PMOCONVERT__` s'appliquent en dernier, les segments du chemin étant
//! séparés par `__` (`PMOCONVERT__CONVERT__ACCELERATION=scalar`).

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::accel::{Acceleration, AccelerationPolicy};
use crate::format::ConversionFlags;

const DEFAULT_CONFIG: &str = include_str!("pmoconvert.yaml");

/// Nom du fichier recherché dans le répertoire de configuration
pub const CONFIG_FILE: &str = "pmoconvert.yaml";

/// Préfixe des variables d'environnement de surcharge
pub const ENV_PREFIX: &str = "PMOCONVERT__";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Réglages d'une session de conversion (section `convert`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub acceleration: AccelerationPolicy,
    pub clip: bool,
    pub dither: bool,
    pub fallback_to_undithered: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            acceleration: AccelerationPolicy::Auto,
            clip: true,
            dither: true,
            fallback_to_undithered: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    convert: ConvertConfig,
}

impl ConvertConfig {
    /// Charge la configuration depuis `directory`, puis applique
    /// l'environnement du processus.
    ///
    /// Un fichier absent n'est pas une erreur : la configuration embarquée
    /// est alors utilisée seule.
    pub fn load(directory: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(directory, std::env::vars())
    }

    /// Comme [`load`](Self::load), avec un jeu de variables explicite.
    pub fn load_with_env<I>(directory: impl AsRef<Path>, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let path = directory.as_ref().join(CONFIG_FILE);
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read_to_string(&path) {
            Ok(data) => {
                info!(config_file=%path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_str(&data)?;
                merge_yaml(&mut value, &lower_keys(external));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(config_file=%path.display(), "Config file not found, using default embedded config");
            }
            Err(err) => return Err(err.into()),
        }

        apply_env_overrides(&mut value, vars);
        Self::from_value(value)
    }

    /// Configuration embarquée complétée par un document YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &lower_keys(external));
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, ConfigError> {
        let document: ConfigDocument = serde_yaml::from_value(value)?;
        Ok(document.convert)
    }

    /// Drapeaux de conversion correspondant aux réglages `clip` et `dither`.
    pub fn flags(&self) -> ConversionFlags {
        ConversionFlags::new(self.clip, self.dither)
    }

    pub fn acceleration(&self) -> Acceleration {
        Acceleration::from_policy(self.acceleration)
    }
}

fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(path) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path: Vec<&str> = path.split("__").collect();
        if !set_value(config, &key_path, convert_env_value(&value)) {
            warn!(env_var=%key, "Ignoring environment override on a non-mapping node");
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
        return parsed;
    }
    Value::String(value.to_string())
}

fn set_value(data: &mut Value, path: &[&str], value: Value) -> bool {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return true;
    };
    let Value::Mapping(map) = data else {
        return false;
    };
    let key = Value::String(first.to_lowercase());
    if rest.is_empty() {
        map.insert(key, value);
        true
    } else {
        let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
        set_value(entry, rest, value)
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let k = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(k, lower_keys(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        _ => value,
    }
}

/// Fusionne `external` dans `default` : les mappings sont fusionnés
/// récursivement, scalaires et séquences sont remplacés.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
