//! Locale persona datasets.
//!
//! Bundled static assets backing the semantic synthesizer: name sets, street
//! templates, cities, regions, postcode/phone formats, and company suffixes
//! per locale. The sets are deliberately small and finite. Persona
//! uniqueness is not guaranteed here; the uniqueness registry is the
//! authority for UNIQUE constraints.

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The closed locale set. Unknown locale inputs fall back to `en_US`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "en_GB")]
    EnGb,
    #[serde(rename = "de_DE")]
    DeDe,
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "en_CA")]
    EnCa,
    #[serde(rename = "en_AU")]
    EnAu,
}

impl Locale {
    /// Parse a locale name; anything unrecognized falls back to `en_US`.
    pub fn parse(input: &str) -> Self {
        match input {
            "en_GB" | "en-GB" => Locale::EnGb,
            "de_DE" | "de-DE" => Locale::DeDe,
            "fr_FR" | "fr-FR" => Locale::FrFr,
            "en_CA" | "en-CA" => Locale::EnCa,
            "en_AU" | "en-AU" => Locale::EnAu,
            _ => Locale::EnUs,
        }
    }

    pub fn personas(&self) -> &'static Personas {
        match self {
            Locale::EnUs => &EN_US,
            Locale::EnGb => &EN_GB,
            Locale::DeDe => &DE_DE,
            Locale::FrFr => &FR_FR,
            Locale::EnCa => &EN_CA,
            Locale::EnAu => &EN_AU,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Locale::EnUs => "en_US",
            Locale::EnGb => "en_GB",
            Locale::DeDe => "de_DE",
            Locale::FrFr => "fr_FR",
            Locale::EnCa => "en_CA",
            Locale::EnAu => "en_AU",
        };
        write!(f, "{}", name)
    }
}

/// One locale's persona asset bundle.
pub struct Personas {
    pub first_names: &'static [&'static str],
    pub last_names: &'static [&'static str],
    pub street_names: &'static [&'static str],
    pub street_suffixes: &'static [&'static str],
    pub cities: &'static [&'static str],
    pub regions: &'static [&'static str],
    /// Pattern-expander template for postcodes.
    pub postcode_pattern: &'static str,
    /// Pattern-expander template for phone numbers.
    pub phone_pattern: &'static str,
    pub company_suffixes: &'static [&'static str],
    pub email_domains: &'static [&'static str],
}

fn pick<'a>(rng: &mut StdRng, set: &[&'a str]) -> &'a str {
    set[rng.random_range(0..set.len())]
}

impl Personas {
    pub fn first_name(&self, rng: &mut StdRng) -> &'static str {
        pick(rng, self.first_names)
    }

    pub fn last_name(&self, rng: &mut StdRng) -> &'static str {
        pick(rng, self.last_names)
    }

    pub fn full_name(&self, rng: &mut StdRng) -> String {
        format!("{} {}", self.first_name(rng), self.last_name(rng))
    }

    pub fn street_address(&self, rng: &mut StdRng) -> String {
        format!(
            "{} {} {}",
            rng.random_range(1..2000),
            pick(rng, self.street_names),
            pick(rng, self.street_suffixes)
        )
    }

    pub fn city(&self, rng: &mut StdRng) -> &'static str {
        pick(rng, self.cities)
    }

    pub fn region(&self, rng: &mut StdRng) -> &'static str {
        pick(rng, self.regions)
    }

    pub fn company(&self, rng: &mut StdRng) -> String {
        format!(
            "{} {}",
            pick(rng, self.last_names),
            pick(rng, self.company_suffixes)
        )
    }

    pub fn email_domain(&self, rng: &mut StdRng) -> &'static str {
        pick(rng, self.email_domains)
    }
}

static EN_US: Personas = Personas {
    first_names: &[
        "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
        "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas",
        "Sarah", "Charles", "Karen",
    ],
    last_names: &[
        "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
        "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
        "Thomas", "Taylor", "Moore", "Jackson", "Martin",
    ],
    street_names: &[
        "Main", "Oak", "Maple", "Cedar", "Elm", "Washington", "Lake", "Hill", "Park", "Pine",
        "Walnut", "Chestnut", "Spring", "River", "Highland",
    ],
    street_suffixes: &["St", "Ave", "Blvd", "Dr", "Ln", "Rd", "Ct", "Way"],
    cities: &[
        "Springfield", "Franklin", "Clinton", "Greenville", "Bristol", "Fairview", "Salem",
        "Madison", "Georgetown", "Arlington", "Ashland", "Dover", "Oxford", "Jackson",
        "Burlington",
    ],
    regions: &[
        "California", "Texas", "Florida", "New York", "Pennsylvania", "Illinois", "Ohio",
        "Georgia", "North Carolina", "Michigan", "Washington", "Arizona", "Colorado", "Oregon",
    ],
    postcode_pattern: "#####",
    phone_pattern: "(###) ###-####",
    company_suffixes: &["Inc", "LLC", "Corp", "Co", "Group", "Holdings", "Industries"],
    email_domains: &["example.com", "example.org", "example.net", "mail.test"],
};

static EN_GB: Personas = Personas {
    first_names: &[
        "Oliver", "Amelia", "George", "Isla", "Harry", "Olivia", "Jack", "Emily", "Charlie",
        "Poppy", "Thomas", "Sophie", "Oscar", "Lily", "William", "Grace", "Henry", "Freya",
        "Alfie", "Charlotte",
    ],
    last_names: &[
        "Smith", "Jones", "Taylor", "Brown", "Williams", "Wilson", "Johnson", "Davies",
        "Patel", "Robinson", "Wright", "Thompson", "Evans", "Walker", "White", "Roberts",
        "Green", "Hall", "Wood", "Clarke",
    ],
    street_names: &[
        "High", "Station", "Church", "Victoria", "Green", "Manor", "Kings", "Queens", "Mill",
        "School", "Park", "Windsor", "Albert", "York", "Grange",
    ],
    street_suffixes: &["Street", "Road", "Lane", "Avenue", "Close", "Gardens", "Crescent"],
    cities: &[
        "London", "Manchester", "Birmingham", "Leeds", "Liverpool", "Bristol", "Sheffield",
        "Newcastle", "Nottingham", "Leicester", "York", "Oxford", "Cambridge", "Brighton",
        "Norwich",
    ],
    regions: &[
        "Greater London", "West Midlands", "Greater Manchester", "West Yorkshire", "Kent",
        "Essex", "Merseyside", "Hampshire", "Lancashire", "Surrey", "Devon", "Norfolk",
    ],
    postcode_pattern: "XX# #XX",
    phone_pattern: "0#### ######",
    company_suffixes: &["Ltd", "PLC", "LLP", "Group", "Holdings", "& Sons", "Partners"],
    email_domains: &["example.co.uk", "example.org.uk", "mail.test", "example.com"],
};

static DE_DE: Personas = Personas {
    first_names: &[
        "Lukas", "Anna", "Leon", "Lena", "Finn", "Emma", "Jonas", "Mia", "Paul", "Hannah",
        "Felix", "Sofia", "Maximilian", "Laura", "Moritz", "Lea", "Niklas", "Marie", "Tim",
        "Johanna",
    ],
    last_names: &[
        "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker",
        "Schulz", "Hoffmann", "Schäfer", "Koch", "Bauer", "Richter", "Klein", "Wolf",
        "Schröder", "Neumann", "Schwarz", "Zimmermann",
    ],
    street_names: &[
        "Haupt", "Bahnhof", "Garten", "Schul", "Berg", "Kirch", "Wald", "Dorf", "Ring",
        "Linden", "Birken", "Mühlen", "Rosen", "Feld", "Brunnen",
    ],
    street_suffixes: &["straße", "weg", "allee", "platz", "gasse", "ring"],
    cities: &[
        "Berlin", "Hamburg", "München", "Köln", "Frankfurt", "Stuttgart", "Düsseldorf",
        "Leipzig", "Dortmund", "Essen", "Bremen", "Dresden", "Hannover", "Nürnberg",
        "Heidelberg",
    ],
    regions: &[
        "Bayern", "Nordrhein-Westfalen", "Baden-Württemberg", "Niedersachsen", "Hessen",
        "Sachsen", "Rheinland-Pfalz", "Berlin", "Schleswig-Holstein", "Brandenburg",
        "Thüringen",
    ],
    postcode_pattern: "#####",
    phone_pattern: "0## ########",
    company_suffixes: &["GmbH", "AG", "KG", "GmbH & Co. KG", "e.V.", "OHG"],
    email_domains: &["beispiel.de", "example.de", "mail.test", "example.com"],
};

static FR_FR: Personas = Personas {
    first_names: &[
        "Lucas", "Emma", "Hugo", "Léa", "Louis", "Chloé", "Gabriel", "Manon", "Arthur",
        "Camille", "Jules", "Sarah", "Adam", "Inès", "Raphaël", "Jade", "Nathan", "Louise",
        "Théo", "Alice",
    ],
    last_names: &[
        "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand",
        "Leroy", "Moreau", "Simon", "Laurent", "Lefebvre", "Michel", "Garcia", "David",
        "Bertrand", "Roux", "Vincent", "Fournier",
    ],
    street_names: &[
        "de la République", "Victor Hugo", "de la Paix", "des Écoles", "du Moulin",
        "Pasteur", "de l'Église", "des Lilas", "Jean Jaurès", "de la Gare", "du Château",
        "des Roses", "Nationale", "de Verdun",
    ],
    street_suffixes: &["Rue", "Avenue", "Boulevard", "Place", "Allée", "Impasse"],
    cities: &[
        "Paris", "Marseille", "Lyon", "Toulouse", "Nice", "Nantes", "Strasbourg",
        "Montpellier", "Bordeaux", "Lille", "Rennes", "Reims", "Toulon", "Grenoble", "Dijon",
    ],
    regions: &[
        "Île-de-France", "Provence-Alpes-Côte d'Azur", "Auvergne-Rhône-Alpes", "Occitanie",
        "Nouvelle-Aquitaine", "Hauts-de-France", "Grand Est", "Bretagne", "Normandie",
        "Pays de la Loire",
    ],
    postcode_pattern: "#####",
    phone_pattern: "0# ## ## ## ##",
    company_suffixes: &["SARL", "SA", "SAS", "EURL", "SNC", "& Fils"],
    email_domains: &["exemple.fr", "example.fr", "mail.test", "example.com"],
};

static EN_CA: Personas = Personas {
    first_names: &[
        "Liam", "Olivia", "Noah", "Emma", "William", "Charlotte", "Benjamin", "Ava", "Lucas",
        "Sophia", "Ethan", "Amelia", "Jacob", "Chloe", "Alexander", "Emily", "Nathan",
        "Abigail", "Logan", "Hannah",
    ],
    last_names: &[
        "Smith", "Brown", "Tremblay", "Martin", "Roy", "Wilson", "MacDonald", "Gagnon",
        "Johnson", "Taylor", "Campbell", "Anderson", "Leblanc", "Côté", "Stewart", "Scott",
        "Moore", "White", "Miller", "Thompson",
    ],
    street_names: &[
        "Main", "King", "Queen", "Yonge", "Bloor", "Dundas", "Granville", "Portage", "Jasper",
        "Robson", "Bay", "Wellington", "Richmond", "Douglas", "Water",
    ],
    street_suffixes: &["St", "Ave", "Blvd", "Dr", "Rd", "Cres", "Way"],
    cities: &[
        "Toronto", "Montreal", "Vancouver", "Calgary", "Edmonton", "Ottawa", "Winnipeg",
        "Quebec City", "Hamilton", "Kitchener", "Halifax", "Victoria", "Saskatoon", "Regina",
        "London",
    ],
    regions: &[
        "Ontario", "Quebec", "British Columbia", "Alberta", "Manitoba", "Saskatchewan",
        "Nova Scotia", "New Brunswick", "Newfoundland and Labrador", "Prince Edward Island",
    ],
    postcode_pattern: "X#X #X#",
    phone_pattern: "(###) ###-####",
    company_suffixes: &["Inc", "Ltd", "Corp", "Co", "Group", "Enterprises"],
    email_domains: &["example.ca", "example.com", "mail.test", "example.org"],
};

static EN_AU: Personas = Personas {
    first_names: &[
        "Oliver", "Charlotte", "Jack", "Olivia", "William", "Amelia", "Noah", "Isla", "Thomas",
        "Mia", "James", "Grace", "Lucas", "Ava", "Henry", "Matilda", "Ethan", "Ella", "Max",
        "Ruby",
    ],
    last_names: &[
        "Smith", "Jones", "Williams", "Brown", "Wilson", "Taylor", "Johnson", "White",
        "Martin", "Anderson", "Thompson", "Nguyen", "Ryan", "Walker", "Harris", "Kelly",
        "King", "Lee", "Wright", "Clarke",
    ],
    street_names: &[
        "George", "Pitt", "Collins", "Bourke", "Queen", "Elizabeth", "Flinders", "King",
        "Hunter", "Macquarie", "Crown", "Victoria", "Albert", "Beach", "Station",
    ],
    street_suffixes: &["St", "Rd", "Ave", "Pde", "Cres", "Ct", "Dr"],
    cities: &[
        "Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide", "Gold Coast", "Canberra",
        "Newcastle", "Wollongong", "Hobart", "Geelong", "Townsville", "Cairns", "Darwin",
        "Ballarat",
    ],
    regions: &[
        "New South Wales", "Victoria", "Queensland", "Western Australia", "South Australia",
        "Tasmania", "Australian Capital Territory", "Northern Territory",
    ],
    postcode_pattern: "####",
    phone_pattern: "04## ### ###",
    company_suffixes: &["Pty Ltd", "Ltd", "Group", "Holdings", "& Co", "Partners"],
    email_domains: &["example.com.au", "example.net.au", "mail.test", "example.com"],
};
