//! Built-in taxonomy rule set
//!
//! One rule per top-level system code. Keywords are written in normalized form
//! (lowercase, abbreviations already expanded, no stop-words) so they compare
//! directly against normalizer output.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Static system-level rule
#[derive(Debug, Clone)]
pub struct TaxonomyRule {
    pub system_code: &'static str,
    pub title: &'static str,
    pub keywords: &'static [&'static str],
    /// Starting confidence before coverage bonuses (0.75-0.90)
    pub base_confidence: f64,
}

/// Immutable rule table indexed by system code
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<TaxonomyRule>,
    by_code: HashMap<&'static str, usize>,
}

impl RuleSet {
    pub fn new(rules: Vec<TaxonomyRule>) -> Self {
        let by_code = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (rule.system_code, idx))
            .collect();
        Self { rules, by_code }
    }

    /// Process-wide built-in table, built on first use
    pub fn builtin() -> &'static RuleSet {
        &BUILTIN_RULES
    }

    pub fn get(&self, system_code: &str) -> Option<&TaxonomyRule> {
        self.by_code.get(system_code).map(|&idx| &self.rules[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Title for a system code, if the code is known
    pub fn title(&self, system_code: &str) -> Option<&'static str> {
        self.get(system_code).map(|rule| rule.title)
    }
}

static BUILTIN_RULES: Lazy<RuleSet> = Lazy::new(|| RuleSet::new(builtin_rules()));

fn builtin_rules() -> Vec<TaxonomyRule> {
    vec![
        TaxonomyRule {
            system_code: "001",
            title: "Air Conditioning, Heating & Ventilating",
            keywords: &[
                "air conditioning", "air conditioning compressor", "hvac", "heater",
                "heater core", "blower", "blower motor", "evaporator", "condenser",
                "refrigerant", "climate", "defroster", "ventilation",
            ],
            base_confidence: 0.85,
        },
        TaxonomyRule {
            system_code: "002",
            title: "Cab & Sheet Metal",
            keywords: &[
                "cab", "mirror", "windshield", "wiper", "wiper blade", "wiper motor", "door",
                "door handle", "seat", "seat belt", "hood", "fender", "grille", "window",
                "glass", "horn", "sun visor",
            ],
            base_confidence: 0.80,
        },
        TaxonomyRule {
            system_code: "003",
            title: "Instruments, Gauges & Meters",
            keywords: &[
                "gauge", "speedometer", "tachometer", "odometer", "instrument",
                "instrument cluster", "dash", "dashboard", "hour meter", "warning light",
                "indicator",
            ],
            base_confidence: 0.80,
        },
        TaxonomyRule {
            system_code: "013",
            title: "Brakes",
            keywords: &[
                "brake", "brakes", "chamber", "brake chamber", "slack adjuster", "adjuster",
                "brake pad", "pad", "rotor", "drum", "brake drum", "shoe", "brake shoe",
                "caliper", "abs", "air dryer", "relay valve", "glad hand", "brake line",
                "brake hose", "parking brake", "spring brake", "master cylinder",
                "wheel cylinder", "lining", "s-cam", "pushrod",
            ],
            base_confidence: 0.90,
        },
        TaxonomyRule {
            system_code: "014",
            title: "Frame & Coupling",
            keywords: &[
                "frame", "frame rail", "crossmember", "bumper", "mud flap", "tow hook",
                "fifth wheel", "hitch", "coupler", "pintle hook", "landing gear",
            ],
            base_confidence: 0.80,
        },
        TaxonomyRule {
            system_code: "015",
            title: "Steering",
            keywords: &[
                "steering", "steering gear", "tie rod", "drag link", "pitman arm",
                "power steering", "steering pump", "steering column", "steering wheel",
                "kingpin", "king pin", "idler arm", "steering rack",
            ],
            base_confidence: 0.88,
        },
        TaxonomyRule {
            system_code: "016",
            title: "Suspension",
            keywords: &[
                "suspension", "shock", "shock absorber", "leaf spring", "spring", "air spring",
                "air bag", "airbag", "torque rod", "equalizer", "hanger", "bushing", "sway bar",
                "stabilizer", "trailing arm", "u-bolt", "ride height",
            ],
            base_confidence: 0.87,
        },
        TaxonomyRule {
            system_code: "017",
            title: "Tires & Tubes",
            keywords: &[
                "tire", "tires", "tread", "tube", "inner tube", "sidewall", "flat", "puncture",
                "tire pressure", "inflation", "retread", "recap", "valve stem",
            ],
            base_confidence: 0.90,
        },
        TaxonomyRule {
            system_code: "018",
            title: "Wheels, Rims, Hubs & Bearings",
            keywords: &[
                "wheel", "wheels", "rim", "hub", "wheel bearing", "bearing", "lug", "lug nut",
                "wheel seal", "hubcap", "hub oil seal", "stud", "wheel stud",
            ],
            base_confidence: 0.87,
        },
        TaxonomyRule {
            system_code: "024",
            title: "Axle - Rear, Driven",
            keywords: &[
                "axle", "differential", "axle shaft", "carrier", "ring gear", "pinion",
                "rear axle", "drive axle", "axle housing", "interaxle",
            ],
            base_confidence: 0.82,
        },
        TaxonomyRule {
            system_code: "027",
            title: "Transmission & Driveline",
            keywords: &[
                "transmission", "gearbox", "shifter", "gear shift", "torque converter",
                "clutch", "clutch disc", "pto", "power take-off", "synchro", "driveshaft",
                "drive shaft", "u-joint", "universal joint", "yoke",
            ],
            base_confidence: 0.85,
        },
        TaxonomyRule {
            system_code: "031",
            title: "Charging System",
            keywords: &[
                "alternator", "charging", "voltage regulator", "battery", "batteries",
                "battery cable", "generator", "charge",
            ],
            base_confidence: 0.85,
        },
        TaxonomyRule {
            system_code: "032",
            title: "Cranking System",
            keywords: &[
                "starter", "starter motor", "starter solenoid", "solenoid", "cranking",
                "starting", "ignition switch", "glow plug",
            ],
            base_confidence: 0.85,
        },
        TaxonomyRule {
            system_code: "034",
            title: "Lighting System",
            keywords: &[
                "light", "lights", "lighting", "lamp", "headlight", "headlamp", "tail light",
                "taillight", "brake light", "turn signal", "marker light", "clearance light",
                "bulb", "led", "reflector", "beacon", "strobe",
            ],
            base_confidence: 0.88,
        },
        TaxonomyRule {
            system_code: "042",
            title: "Cooling System",
            keywords: &[
                "cooling", "coolant", "radiator", "water pump", "thermostat", "fan",
                "fan clutch", "radiator hose", "antifreeze", "overheating", "overheat",
                "coolant reservoir", "surge tank",
            ],
            base_confidence: 0.86,
        },
        TaxonomyRule {
            system_code: "043",
            title: "Exhaust System",
            keywords: &[
                "exhaust", "muffler", "tailpipe", "exhaust pipe", "diesel particulate filter",
                "diesel exhaust fluid", "exhaust gas recirculation", "catalytic converter",
                "scr", "exhaust manifold", "doser",
            ],
            base_confidence: 0.86,
        },
        TaxonomyRule {
            system_code: "044",
            title: "Fuel System",
            keywords: &[
                "fuel", "fuel pump", "fuel filter", "injector", "fuel injector", "fuel tank",
                "fuel line", "carburetor", "diesel", "gasoline", "lift pump", "primer pump",
            ],
            base_confidence: 0.86,
        },
        TaxonomyRule {
            system_code: "045",
            title: "Power Plant",
            keywords: &[
                "engine", "cylinder head", "head gasket", "piston", "crankshaft", "camshaft",
                "oil pan", "valve cover", "turbocharger", "intake manifold", "engine mount",
                "oil pressure", "timing belt", "timing chain", "rocker arm",
            ],
            base_confidence: 0.84,
        },
        TaxonomyRule {
            system_code: "071",
            title: "Body",
            keywords: &[
                "body", "cargo", "liftgate", "tailgate", "roll-up door", "side panel", "roof",
                "floor", "van body", "dump body", "reefer", "toolbox", "ladder rack",
            ],
            base_confidence: 0.78,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalizer::normalize;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_has_nineteen_unique_systems() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.len(), 19);

        let codes: HashSet<_> = rules.iter().map(|r| r.system_code).collect();
        assert_eq!(codes.len(), 19, "System codes must be unique");
    }

    #[test]
    fn test_base_confidence_range() {
        for rule in RuleSet::builtin().iter() {
            assert!(
                (0.75..=0.90).contains(&rule.base_confidence),
                "{} base confidence {} out of range",
                rule.system_code,
                rule.base_confidence
            );
        }
        assert_eq!(RuleSet::builtin().get("013").unwrap().base_confidence, 0.90);
    }

    #[test]
    fn test_keywords_are_already_normalized() {
        for rule in RuleSet::builtin().iter() {
            for keyword in rule.keywords {
                assert_eq!(
                    normalize(keyword).join(" "),
                    *keyword,
                    "Keyword '{}' of {} would never match normalized text",
                    keyword,
                    rule.system_code
                );
            }
        }
    }

    #[test]
    fn test_lookup_by_code() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.title("034"), Some("Lighting System"));
        assert!(rules.get("999").is_none());
    }
}
