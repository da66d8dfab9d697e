//! Clearance rule tables and obstruction-type resolution.
//!
//! Clearance distances are manufacturer requirements in millimetres, measured
//! from the obstruction edge to the flue/boiler/radiator position. The table
//! is keyed by brand and installation mode; an unknown brand falls back to
//! the default brand's rules for the requested mode.
//!
//! The resolver folds raw detector vocabulary (`eaves`, `wall_left`, ...)
//! onto canonical rule keys so the externally supplied detector and the rule
//! table can evolve independently. A label without a mapping, or a canonical
//! key absent from the rule set, resolves to no requirement at all: such
//! objects are skipped, never rejected.

use serde::{Deserialize, Serialize};

/// Brand used when the requested brand has no rule entry.
pub const DEFAULT_BRAND: &str = "worcester";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstallationMode {
    Flue,
    Boiler,
    Radiator,
}

impl InstallationMode {
    /// Parse a request-supplied mode label. Anything outside the fixed set is
    /// a caller error handled by the transport layer.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "flue" => Some(Self::Flue),
            "boiler" => Some(Self::Boiler),
            "radiator" => Some(Self::Radiator),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flue => "flue",
            Self::Boiler => "boiler",
            Self::Radiator => "radiator",
        }
    }
}

/// Clearance distances in millimetres, keyed by canonical obstruction key.
#[derive(Debug)]
pub struct ClearanceRuleSet {
    entries: &'static [(&'static str, u32)],
}

impl ClearanceRuleSet {
    /// Look up the clearance for a canonical key. Zero is a defined
    /// requirement; `None` means the rule set has nothing to say.
    pub fn clearance_mm(&self, canonical_key: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(key, _)| *key == canonical_key)
            .map(|(_, mm)| *mm)
    }
}

struct BrandRules {
    brand: &'static str,
    flue: ClearanceRuleSet,
    boiler: ClearanceRuleSet,
    radiator: ClearanceRuleSet,
}

// All brands currently publish identical figures, but brand stays a
// first-class key so per-brand divergence is a data change only.
// The first entry is the fallback for unknown brands.
static BRAND_RULES: &[BrandRules] = &[
    BrandRules {
        brand: "worcester",
        flue: ClearanceRuleSet {
            entries: &[
                ("window", 300),
                ("door", 300),
                ("corner", 300),
                ("soffit", 300),
                ("vent", 300),
                ("boundary", 600),
                ("ground", 2000),
                ("downpipe", 75),
            ],
        },
        boiler: ClearanceRuleSet {
            entries: &[
                ("wall_side", 50),
                ("wall_front", 300),
                ("ceiling", 50),
                ("floor", 500),
            ],
        },
        radiator: ClearanceRuleSet {
            entries: &[
                ("wall_side", 50),
                ("wall_front", 300),
                ("ceiling", 0),
                ("floor", 500),
            ],
        },
    },
    BrandRules {
        brand: "vaillant",
        flue: ClearanceRuleSet {
            entries: &[
                ("window", 300),
                ("door", 300),
                ("corner", 300),
                ("soffit", 300),
                ("vent", 300),
                ("boundary", 600),
                ("ground", 2000),
                ("downpipe", 75),
            ],
        },
        boiler: ClearanceRuleSet {
            entries: &[
                ("wall_side", 50),
                ("wall_front", 300),
                ("ceiling", 50),
                ("floor", 500),
            ],
        },
        radiator: ClearanceRuleSet {
            entries: &[
                ("wall_side", 50),
                ("wall_front", 300),
                ("ceiling", 0),
                ("floor", 500),
            ],
        },
    },
    BrandRules {
        brand: "ideal",
        flue: ClearanceRuleSet {
            entries: &[
                ("window", 300),
                ("door", 300),
                ("corner", 300),
                ("soffit", 300),
                ("vent", 300),
                ("boundary", 600),
                ("ground", 2000),
                ("downpipe", 75),
            ],
        },
        boiler: ClearanceRuleSet {
            entries: &[
                ("wall_side", 50),
                ("wall_front", 300),
                ("ceiling", 50),
                ("floor", 500),
            ],
        },
        radiator: ClearanceRuleSet {
            entries: &[
                ("wall_side", 50),
                ("wall_front", 300),
                ("ceiling", 0),
                ("floor", 500),
            ],
        },
    },
];

/// Rule set for a brand and installation mode. Total: unknown brands use the
/// default brand's rules.
pub fn rules_for(brand: &str, mode: InstallationMode) -> &'static ClearanceRuleSet {
    let brand_rules = BRAND_RULES
        .iter()
        .find(|rules| rules.brand == brand)
        .unwrap_or(&BRAND_RULES[0]);
    match mode {
        InstallationMode::Flue => &brand_rules.flue,
        InstallationMode::Boiler => &brand_rules.boiler,
        InstallationMode::Radiator => &brand_rules.radiator,
    }
}

/// Fold a raw detector label onto its canonical rule key.
pub fn canonical_key(label: &str) -> Option<&'static str> {
    match label {
        "window" => Some("window"),
        "door" => Some("door"),
        "corner" => Some("corner"),
        "soffit" | "eaves" => Some("soffit"),
        "vent" => Some("vent"),
        "downpipe" => Some("downpipe"),
        "boundary" => Some("boundary"),
        "wall_left" | "wall_right" => Some("wall_side"),
        "wall_back" => Some("wall_front"),
        "ceiling" => Some("ceiling"),
        "floor" => Some("floor"),
        _ => None,
    }
}

/// Resolve a raw detector label to a clearance distance under the given rule
/// set. `None` means no requirement applies and the object is ignored.
pub fn resolve_clearance_mm(label: &str, rules: &ClearanceRuleSet) -> Option<u32> {
    canonical_key(label).and_then(|key| rules.clearance_mm(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_labels_round_trip() {
        for mode in [
            InstallationMode::Flue,
            InstallationMode::Boiler,
            InstallationMode::Radiator,
        ] {
            assert_eq!(InstallationMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(InstallationMode::parse("chimney"), None);
        assert_eq!(InstallationMode::parse("Flue"), None);
    }

    #[test]
    fn synonyms_fold_to_canonical_keys() {
        assert_eq!(canonical_key("eaves"), Some("soffit"));
        assert_eq!(canonical_key("wall_left"), Some("wall_side"));
        assert_eq!(canonical_key("wall_right"), Some("wall_side"));
        assert_eq!(canonical_key("wall_back"), Some("wall_front"));
        assert_eq!(canonical_key("window"), Some("window"));
        assert_eq!(canonical_key("tree"), None);
    }

    #[test]
    fn boundary_resolves_identically_across_brands() {
        for brand in ["worcester", "vaillant", "ideal"] {
            let rules = rules_for(brand, InstallationMode::Flue);
            assert_eq!(resolve_clearance_mm("boundary", rules), Some(600));
        }
    }

    #[test]
    fn unknown_brand_falls_back_to_default() {
        let rules = rules_for("baxi", InstallationMode::Flue);
        assert_eq!(resolve_clearance_mm("window", rules), Some(300));
        assert_eq!(resolve_clearance_mm("ground", rules), None); // no detector synonym
        assert_eq!(rules.clearance_mm("ground"), Some(2000));
    }

    #[test]
    fn zero_clearance_is_a_defined_rule() {
        let rules = rules_for("worcester", InstallationMode::Radiator);
        assert_eq!(resolve_clearance_mm("ceiling", rules), Some(0));
    }

    #[test]
    fn keys_missing_from_a_rule_set_resolve_to_none() {
        // window clearances only apply in flue mode
        let rules = rules_for("worcester", InstallationMode::Boiler);
        assert_eq!(resolve_clearance_mm("window", rules), None);
        assert_eq!(resolve_clearance_mm("wall_left", rules), Some(50));
    }
}
