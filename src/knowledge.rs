//! Static off-road knowledge tables.
//!
//! Everything here is `'static` data that is never mutated, so handlers read it
//! concurrently without any locking. Callers that need to extend a list (the
//! maintenance advisor) copy it first.

use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use serde::{ser::SerializeMap, Serialize, Serializer};

/// A named, ordered list of advisory strings.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub name: &'static str,
    pub items: &'static [&'static str],
}

/// An ordered set of sections. Serialises as a JSON object whose keys keep
/// their declaration order.
#[derive(Debug, Clone, Copy)]
pub struct Table(&'static [Section]);

impl Table {
    pub fn sections(&self) -> &'static [Section] {
        self.0
    }

    pub fn get(&self, name: &str) -> Option<&'static [&'static str]> {
        self.0
            .iter()
            .find(|section| section.name == name)
            .map(|section| section.items)
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0 {
            map.serialize_entry(section.name, section.items)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Remedy {
    pub tools: &'static [&'static str],
    pub steps: &'static [&'static str],
    pub follow_up: &'static str,
}

pub const GENERAL_TERRAIN: &str = "general";

pub const EMERGENCY_CONTACT: &str = "Local offroad recovery: 1-800-OFF-ROAD";

static GUIDE: &[Section] = &[
    Section {
        name: "Driving Techniques",
        items: &[
            "Lower tire pressure for better traction on sand and rocks.",
            "Use a low gear and steady throttle on steep inclines.",
            "Maintain momentum in sand and mud, but avoid spinning your wheels.",
            "When crossing water, create a gentle bow wave and avoid stopping.",
        ],
    },
    Section {
        name: "Safety & Recovery",
        items: &[
            "Always check weather conditions before heading out.",
            "Carry recovery gear: shovel, traction boards, and a winch.",
            "Never wheel alone - use the buddy system.",
            "Know your vehicle's limits and your own skill level.",
        ],
    },
    Section {
        name: "Vehicle Preparation",
        items: &[
            "Know your vehicle's approach, departure, and breakover angles.",
            "Secure all loose items inside and outside your vehicle.",
            "Ensure you have a full-size spare tire and the tools to change it.",
            "Pack an emergency kit with food, water, and first aid supplies.",
        ],
    },
    Section {
        name: "Trail Etiquette",
        items: &[
            "Stay on designated trails to protect the environment.",
            "Yield to uphill traffic.",
            "Pack out everything you pack in - leave no trace.",
            "Communicate with other drivers on the trail via radio or signals.",
        ],
    },
];

static VEHICLE_CHECKS: &[Section] = &[
    Section {
        name: "pre_trip",
        items: &[
            "Check tire pressure and condition",
            "Inspect all fluid levels",
            "Check for any leaks",
            "Test all lights",
            "Check 4WD system functionality",
        ],
    },
    Section {
        name: "post_trip",
        items: &[
            "Inspect for any new damage",
            "Check for loose components",
            "Clean undercarriage",
            "Check fluid levels",
            "Inspect brakes",
        ],
    },
];

static MAINTENANCE: &[Section] = &[
    Section {
        name: "desert",
        items: &[
            "Check air filter",
            "Inspect cooling system",
            "Bring extra water for the vehicle",
        ],
    },
    Section {
        name: "mountains",
        items: &[
            "Check brakes",
            "Inspect tires for rock damage",
            "Test 4-low gear",
        ],
    },
    Section {
        name: "mud",
        items: &[
            "Check for differential breathers",
            "Protect air intake",
            "Prepare for extensive cleaning post-trip",
        ],
    },
    Section {
        name: GENERAL_TERRAIN,
        items: &[
            "Change oil every 3000-5000 miles",
            "Rotate tires every 5000-7500 miles",
            "Inspect brake pads every 10000 miles",
        ],
    },
];

static MECHANIC_ASSIST: &[(&str, Remedy)] = &[
    (
        "flat tire",
        Remedy {
            tools: &["Jack", "Lug wrench", "Full-size spare tire", "Wheel chocks"],
            steps: &[
                "Find a level, stable surface.",
                "Chock the wheels on the opposite side of the flat.",
                "Loosen the lug nuts before jacking up the vehicle.",
                "Lift the vehicle, remove the lug nuts, and replace the tire.",
                "Hand-tighten lug nuts, lower the vehicle, and then fully tighten in a star pattern.",
            ],
            follow_up: "Get the flat tire repaired or replaced as soon as possible. Check the spare tire pressure.",
        },
    ),
    (
        "overheating",
        Remedy {
            tools: &["Coolant", "Water", "Gloves"],
            steps: &[
                "Pull over safely and turn off the engine.",
                "Turn on the heater to full blast to draw heat away from the engine.",
                "DO NOT open the radiator cap while the engine is hot.",
                "After it cools (30-60 mins), check the coolant level and add more if needed.",
                "Check for visible leaks in the cooling system hoses.",
            ],
            follow_up: "Have your cooling system inspected by a mechanic for leaks or blockages.",
        },
    ),
    (
        "stuck",
        Remedy {
            tools: &[
                "Shovel",
                "Traction boards",
                "Winch (if equipped)",
                "Tire pressure gauge",
            ],
            steps: &[
                "Assess the situation. Do not spin your wheels, as this will dig you in deeper.",
                "Clear any obstructions from around the tires and undercarriage.",
                "Lower tire pressure to 15-20 PSI for better traction.",
                "Use traction boards in front of the drive wheels.",
                "If using a winch, ensure a secure anchor point and use a damper on the line.",
            ],
            follow_up: "Re-inflate tires to normal pressure once back on a hard surface. Clean the undercarriage.",
        },
    ),
    (
        "battery dead",
        Remedy {
            tools: &["Jumper cables"],
            steps: &[
                "Connect the red clamp to the positive (+) terminal of the dead battery.",
                "Connect the other red clamp to the positive (+) terminal of the good battery.",
                "Connect the black clamp to the negative (-) terminal of the good battery.",
                "Connect the final black clamp to an unpainted metal surface on the dead vehicle's frame.",
                "Start the working vehicle, wait a few minutes, then try to start the dead vehicle.",
            ],
            follow_up: "Let the vehicle run for at least 15-20 minutes to charge the battery. Have the battery and alternator tested.",
        },
    ),
];

pub fn guide() -> Table {
    Table(GUIDE)
}

pub fn vehicle_checklist() -> Table {
    Table(VEHICLE_CHECKS)
}

/// Maintenance items for a terrain key. Unknown keys get the general list.
pub fn maintenance_items(terrain: &str) -> &'static [&'static str] {
    let table = Table(MAINTENANCE);
    table
        .get(&normalize_key(terrain))
        .or_else(|| table.get(GENERAL_TERRAIN))
        .unwrap_or(&[])
}

pub fn general_maintenance() -> &'static [&'static str] {
    maintenance_items(GENERAL_TERRAIN)
}

pub fn remedy(issue: &str) -> Option<&'static Remedy> {
    let key = normalize_key(issue);
    MECHANIC_ASSIST
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, remedy)| remedy)
}

/// Lower-cased, trimmed form used for every keyed lookup.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct Tip {
    pub category: &'static str,
    pub tip: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Picks a category uniformly, then a tip uniformly within it.
pub fn random_tip<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Tip {
    let section = GUIDE.choose(rng).unwrap_or(&GUIDE[0]);
    let tip = section.items.choose(rng).copied().unwrap_or_default();
    Tip {
        category: section.name,
        tip,
        timestamp: now,
    }
}
