//! The asset category registry.
//!
//! Every convertible description file belongs to exactly one category. A
//! category names the marker that identifies its files, the schema the
//! compiler needs to read them, and the extension of the compiled artifact.
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── pc.config.json              # Engine configuration (suffix marker)
//! ├── buses.json                  # Bus definitions (suffix marker)
//! ├── soundbanks/                 # One directory per category
//! │   └── init.json
//! ├── sounds/
//! │   └── ambience/
//! │       └── wind.json           # Discovered recursively
//! ├── events/
//! └── ...
//! ```
//!
//! ## Ordering
//!
//! [`CATEGORIES`] is an ordered table of `(predicate, category)` pairs.
//! Classification walks it front to back and the first match wins, so
//! suffix markers come before directory markers: `soundbanks/main.config.json`
//! is engine configuration, not a sound bank. Files that match nothing fall
//! back to [`FALLBACK`].
//!
//! Plan order follows the same table: configuration and buses first, then the
//! per-directory categories.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;
use thiserror::Error;

/// Identifies one category of convertible asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    EngineConfig,
    Buses,
    SoundBanks,
    Collections,
    Sounds,
    Events,
    Attenuations,
    Switches,
    SwitchContainers,
    Rtpcs,
    Effects,
    Environments,
    Generic,
}

impl CategoryKind {
    /// Snake-case label used on the command line and in output.
    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::EngineConfig => "engine_config",
            CategoryKind::Buses => "buses",
            CategoryKind::SoundBanks => "soundbanks",
            CategoryKind::Collections => "collections",
            CategoryKind::Sounds => "sounds",
            CategoryKind::Events => "events",
            CategoryKind::Attenuations => "attenuations",
            CategoryKind::Switches => "switches",
            CategoryKind::SwitchContainers => "switch_containers",
            CategoryKind::Rtpcs => "rtpc",
            CategoryKind::Effects => "effects",
            CategoryKind::Environments => "environments",
            CategoryKind::Generic => "generic",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CategoryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown asset category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryKind {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        categories()
            .iter()
            .chain(std::iter::once(&FALLBACK))
            .map(|c| c.kind)
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// How files are recognized as members of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// The file name ends with this dotted token (e.g. `.config.json`), or is
    /// the token without its dot (`buses.json`). Only files directly in the
    /// project root are discovered.
    Suffix(&'static str),
    /// The path, relative to the project root, starts with this directory.
    /// Discovery walks the directory recursively.
    Directory(&'static str),
    /// Matches nothing; used by the fallback category.
    None,
}

/// One kind of convertible description file.
#[derive(Debug, PartialEq, Eq)]
pub struct AssetCategory {
    pub kind: CategoryKind,
    pub marker: Marker,
    /// Base name of the compiler schema, without extension.
    pub schema_id: &'static str,
    /// Extension of the compiled artifact, without the leading dot.
    pub output_extension: &'static str,
}

impl AssetCategory {
    /// Whether `relative` (a path relative to the project root) belongs
    /// to this category.
    ///
    /// Suffix markers look at the file name only, and only at whole
    /// dot-separated parts of it: `reload_config.json` is not configuration.
    /// Directory markers look at the first normal component, so a project
    /// living under `/home/sounds/` does not turn every file into a sound.
    pub fn matches(&self, relative: &Path) -> bool {
        match self.marker {
            Marker::Suffix(token) => relative
                .file_name()
                .map(|name| {
                    let name = name.to_string_lossy();
                    name.ends_with(token) || token.strip_prefix('.') == Some(&*name)
                })
                .unwrap_or(false),
            Marker::Directory(dir) => {
                let mut components = relative
                    .components()
                    .filter(|c| matches!(c, Component::Normal(_)));
                // A bare `sounds` is the directory itself, not a member.
                match (components.next(), components.next()) {
                    (Some(first), Some(_)) => first.as_os_str() == dir,
                    _ => false,
                }
            }
            Marker::None => false,
        }
    }

    /// True for categories whose files live directly in the project root.
    pub fn is_root_only(&self) -> bool {
        matches!(self.marker, Marker::Suffix(_))
    }
}

/// Registry of specific categories, in classification and plan order.
pub static CATEGORIES: &[AssetCategory] = &[
    AssetCategory {
        kind: CategoryKind::EngineConfig,
        marker: Marker::Suffix(".config.json"),
        schema_id: "engine_config_definition",
        output_extension: "amconfig",
    },
    AssetCategory {
        kind: CategoryKind::Buses,
        marker: Marker::Suffix(".buses.json"),
        schema_id: "buses_definition",
        output_extension: "ambus",
    },
    AssetCategory {
        kind: CategoryKind::SoundBanks,
        marker: Marker::Directory("soundbanks"),
        schema_id: "sound_bank_definition",
        output_extension: "ambank",
    },
    AssetCategory {
        kind: CategoryKind::Collections,
        marker: Marker::Directory("collections"),
        schema_id: "collection_definition",
        output_extension: "amcollection",
    },
    AssetCategory {
        kind: CategoryKind::Sounds,
        marker: Marker::Directory("sounds"),
        schema_id: "sound_definition",
        output_extension: "amsound",
    },
    AssetCategory {
        kind: CategoryKind::Events,
        marker: Marker::Directory("events"),
        schema_id: "event_definition",
        output_extension: "amevent",
    },
    AssetCategory {
        kind: CategoryKind::Attenuations,
        marker: Marker::Directory("attenuators"),
        schema_id: "attenuation_definition",
        output_extension: "amattenuation",
    },
    AssetCategory {
        kind: CategoryKind::Switches,
        marker: Marker::Directory("switches"),
        schema_id: "switch_definition",
        output_extension: "amswitch",
    },
    AssetCategory {
        kind: CategoryKind::SwitchContainers,
        marker: Marker::Directory("switch_containers"),
        schema_id: "switch_container_definition",
        output_extension: "amswitchcontainer",
    },
    AssetCategory {
        kind: CategoryKind::Rtpcs,
        marker: Marker::Directory("rtpc"),
        schema_id: "rtpc_definition",
        output_extension: "amrtpc",
    },
    AssetCategory {
        kind: CategoryKind::Effects,
        marker: Marker::Directory("effects"),
        schema_id: "effect_definition",
        output_extension: "amfx",
    },
    AssetCategory {
        kind: CategoryKind::Environments,
        marker: Marker::Directory("environments"),
        schema_id: "environment_definition",
        output_extension: "amenv",
    },
];

/// Category for files that match no marker.
pub static FALLBACK: AssetCategory = AssetCategory {
    kind: CategoryKind::Generic,
    marker: Marker::None,
    schema_id: "generic",
    output_extension: "ambin",
};

/// All specific categories in registry order.
pub fn categories() -> &'static [AssetCategory] {
    CATEGORIES
}

/// Look up a category by kind, including the fallback.
#[cfg(test)]
pub(crate) fn by_kind(kind: CategoryKind) -> &'static AssetCategory {
    CATEGORIES
        .iter()
        .find(|c| c.kind == kind)
        .unwrap_or(&FALLBACK)
}

/// Category → output extension mapping, fallback last.
///
/// Lets tooling predict an artifact name without planning a project.
pub fn extension_table() -> Vec<(CategoryKind, &'static str)> {
    categories()
        .iter()
        .chain(std::iter::once(&FALLBACK))
        .map(|c| (c.kind, c.output_extension))
        .collect()
}
