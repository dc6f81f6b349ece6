//! Archetype keyword table for rule-based classification.
//!
//! Each archetype pairs English and Lithuanian trigger words (matched against
//! category names) with dish keywords (matched against dish text). All words
//! are lowercase.

/// One rule-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Archetype {
    pub name: &'static str,
    /// A category whose name contains any of these words uses this archetype.
    pub category_triggers: &'static [&'static str],
    /// The dish matches when its text contains any of these words...
    pub dish_keywords: &'static [&'static str],
    /// ...and none of these.
    pub exclusion_keywords: &'static [&'static str],
}

impl Archetype {
    /// True when this archetype governs a category with the given name.
    pub fn governs(&self, category_name: &str) -> bool {
        contains_any(category_name, self.category_triggers)
    }

    /// Decides a dish text blob against this archetype.
    pub fn accepts(&self, dish_text: &str) -> bool {
        contains_any(dish_text, self.dish_keywords) && !self.excludes(dish_text)
    }

    /// True when the dish text carries an exclusion keyword.
    pub fn excludes(&self, dish_text: &str) -> bool {
        contains_any(dish_text, self.exclusion_keywords)
    }
}

/// Meat words that disqualify a dish from vegetarian categories.
pub const MEAT_KEYWORDS: &[&str] = &[
    "chicken",
    "beef",
    "pork",
    "fish",
    "meat",
    "vištiena",
    "jautiena",
    "kiauliena",
    "žuvis",
    "mėsa",
];

/// Default archetypes, checked in order; the first governing entry decides.
pub const ARCHETYPES: &[Archetype] = &[
    Archetype {
        name: "poultry",
        category_triggers: &["chicken", "vištiena", "višta", "poultry"],
        dish_keywords: &[
            "chicken",
            "vištiena",
            "višta",
            "viščiukas",
            "grilled chicken",
            "fried chicken",
            "roasted chicken",
            "chicken breast",
            "chicken wing",
            "chicken thigh",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "beef",
        category_triggers: &["beef", "jautiena", "mėsa"],
        dish_keywords: &[
            "beef", "jautiena", "steak", "burger", "meatball", "mėsos", "mėsa",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "pork",
        category_triggers: &["pork", "kiauliena"],
        dish_keywords: &[
            "pork",
            "kiauliena",
            "bacon",
            "ham",
            "sausage",
            "dešra",
            "šoninė",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "seafood",
        category_triggers: &["fish", "žuvis", "seafood", "jūros gėrybės"],
        dish_keywords: &[
            "fish", "žuvis", "salmon", "lašiša", "tuna", "tunas", "cod", "menkė", "shrimp",
            "krevetė", "seafood",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "vegetarian",
        category_triggers: &["vegetarian", "vegetariškas", "vegan", "veganiška"],
        dish_keywords: &[
            "vegetable",
            "daržovė",
            "salad",
            "salotos",
            "tofu",
            "veggie",
            "plant-based",
            "augalinis",
        ],
        exclusion_keywords: MEAT_KEYWORDS,
    },
    Archetype {
        name: "pasta",
        category_triggers: &["pasta", "makaronai"],
        dish_keywords: &[
            "pasta",
            "makaronai",
            "spaghetti",
            "spagečiai",
            "penne",
            "fusilli",
            "linguine",
            "noodle",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "soup",
        category_triggers: &["soup", "sriuba"],
        dish_keywords: &[
            "soup",
            "sriuba",
            "broth",
            "sultinys",
            "chowder",
            "bisque",
            "stew",
            "troškinys",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "dessert",
        category_triggers: &["dessert", "desertas", "sweet", "saldus"],
        dish_keywords: &[
            "cake",
            "tortas",
            "pie",
            "pyragas",
            "ice cream",
            "ledai",
            "chocolate",
            "šokoladas",
            "cookie",
            "sausainis",
            "dessert",
            "sweet",
            "saldus",
            "desertas",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "salad",
        category_triggers: &["salad", "salotos"],
        dish_keywords: &[
            "salad",
            "salotos",
            "lettuce",
            "salotos lapai",
            "greens",
            "žalumynai",
        ],
        exclusion_keywords: &[],
    },
    Archetype {
        name: "breakfast",
        category_triggers: &["breakfast", "pusryčiai"],
        dish_keywords: &[
            "egg",
            "kiaušinis",
            "pancake",
            "blynai",
            "oatmeal",
            "avižinė",
            "breakfast",
            "pusryčiai",
            "cereal",
            "dribsniai",
        ],
        exclusion_keywords: &[],
    },
];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}
