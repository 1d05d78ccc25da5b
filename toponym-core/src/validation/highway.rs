//! Road-name vocabularies applied to `highway` entities.
//!
//! The defaults target French road names: a blacklist of known-bad shapes, a
//! whitelist of usual road-type prefixes, and foreign first words accepted in
//! border regions without being whitelisted.

use std::collections::HashSet;

use regex::Regex;

use crate::catalogue::RuleError;

/// `highway` values whose names are checked.
pub const ROADWAY_VALUES: &[&str] = &[
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "unclassified",
    "residential",
    "motorway_link",
    "trunk_link",
    "primary_link",
    "secondary_link",
    "tertiary_link",
    "living_street",
    "service",
    "pedestrian",
    "track",
    "bus_guideway",
    "road",
    "busway",
];

const BLACKLIST: &[&str] = &[
    r"^Chemin Ancien Chemin ",
    r"^Chemin Chemin ",
    r"^Chemin [Rr]ural (No|Numéro|n°)",
    r"^Chemin Vicinal ",
    // Abbreviation, e.g. "Rue A. Briand".
    r"^\w+ [A-Z]+\.",
    r"^\w+ Georges Sand",
    r"^\w+ Pierre Ronsard",
    r"^\w+ Roger-Martin du Gard",
    r"^\w+ Marroniers*",
    r"^\w+ D'\w+",
    r"^\w+ De \w+",
    r"^\w+ Des \w+",
];

// Regex fragments, anchored at the start of the name.
const ROAD_TYPES: &[&str] = &[
    "Allée", "Ancien Chemin", "Autoroute", "Avenue",
    "Basse Corniche", "Belvédère", "Boucle", "Boulevard", "Bretelle",
    "Carreau", "Carrefour", "Chasse", "Chaussée", "Chemin", "Cité", "Clos", "Corniche", "Cour",
    "Cours", "Côte",
    "Descente", "Domaine",
    "Échangeur", "Espace", "Esplanade",
    "Faubourg",
    "Grand Place", "Grande Route", "Grand'Rue", "Grande Rue", "Giratoire",
    "Hameau",
    "Impasse",
    "Jardins?",
    "Les Quatre Routes", "Lotissement",
    "Mail", "Montée",
    "Place", "Parc", "Parvis", "Passage", "Passerelle", "Périphérique", "Petite Rue", "Pont",
    "Port", "Porte", "Promenade",
    "Quai",
    "Résidence", "Rocade", "Rond-Point", "Route", "Rue",
    "Sente", "Sentier", "Square", "Sortie",
    "Terrasse", "Traverse", "Tunnel",
    "Viaduc", "Villa", "Voie",
    "L'Aquitaine", "La Francilienne", "L’Océane", "L'Européenne", "La Comtoise",
    "La Provençale", "La Languedocienne", "La Méridienne", "L'Arverne", "La Transeuropéenne",
    "L'Occitane",
];

const FOREIGN_FIRST_WORDS: &[&str] = &[
    // Germany
    "Am Altrheinhafen", "Austraße",
    "Bachweg", "Badener", "Berger", "Berliner",
    "Cabot",
    "Dammstraße", "Dammweg", "Darrweg",
    "Eichenweg", "Elsässerstrasse",
    "Fischerstraße", "Fliederweg", "Friedhofstraße",
    "Greitweg", "Grünfelderstraße",
    "Hafenstraße", "Hans-Thoma-Straße", "Hechtgasse", "Hinterlanddamm",
    "Industriestraße", "Im Grün", "Im Rheinwald",
    "Glockenstraße", "Grißheimer", "Gustav-Regler-Platz",
    "Josefsgasse",
    "Kreuzstraße",
    "Lindenstraße",
    "Messeplatz", "Mittelstraße",
    "Narzissenweg", "Nelkenstraße", "Neuburgweierer",
    "Oberwaldstraße",
    "Panoramaweg", "Pappelweg", "Pfalzstraße", "Pfarrstraße",
    "Rathausplatz", "Rheindamm", "Rheinseitenstraße", "Rheinstraße", "Ringstraße",
    "Robert-Bosch-Straße", "Russenstraße",
    "Schifferweg", "Schmiedgasse", "Steinstraße", "Südendstraße",
    "Tullastraße", "Tulpenstraße",
    "Ulmer",
    "Victoria",
    "Wörthweg",
    "Zainweg", "Zwiebelbühndstraße",
    // Monaco
    "Lacets Saint-Léon",
    "Rascasse",
    "Virage Antony Nogues",
];

/// Verdict of [`HighwayNameRules::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighwayVerdict<'a> {
    /// The name matches a known-bad pattern.
    Blacklisted(&'a str),
    /// The name starts with no known road-type prefix.
    UnknownRoadType,
    /// Nothing to report.
    Accepted,
}

/// Blacklist and whitelist vocabularies for road names.
#[derive(Debug, Clone)]
pub struct HighwayNameRules {
    roadway_values: HashSet<String>,
    blacklist: Vec<Regex>,
    whitelist: Regex,
}

impl HighwayNameRules {
    /// French defaults.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidPattern`] if a vocabulary entry fails to compile.
    pub fn french() -> Result<Self, RuleError> {
        let whitelist = ROAD_TYPES.iter().chain(FOREIGN_FIRST_WORDS);
        Self::new(ROADWAY_VALUES.iter().copied(), BLACKLIST.iter().copied(), whitelist.copied())
    }

    /// Build custom vocabularies. Whitelist entries are regex fragments
    /// matched at the start of the name.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidPattern`] if a pattern fails to compile.
    pub fn new<'a, V, B, W>(roadway_values: V, blacklist: B, whitelist: W) -> Result<Self, RuleError>
    where
        V: IntoIterator<Item = &'a str>,
        B: IntoIterator<Item = &'a str>,
        W: IntoIterator<Item = &'a str>,
    {
        let blacklist = blacklist
            .into_iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        let prefixes: Vec<&str> = whitelist.into_iter().collect();
        let whitelist = compile(&format!("^(?:{})", prefixes.join("|")))?;
        Ok(Self {
            roadway_values: roadway_values.into_iter().map(str::to_owned).collect(),
            blacklist,
            whitelist,
        })
    }

    /// Whether `highway=<value>` is a roadway whose name is checked.
    #[must_use]
    pub fn is_roadway(&self, value: &str) -> bool {
        self.roadway_values.contains(value)
    }

    /// Classify a road name. The whitelist is only consulted when
    /// `use_whitelist` is set.
    #[must_use]
    pub fn classify(&self, name: &str, use_whitelist: bool) -> HighwayVerdict<'_> {
        if let Some(rule) = self.blacklist.iter().find(|rule| rule.is_match(name)) {
            return HighwayVerdict::Blacklisted(rule.as_str());
        }
        if use_whitelist && !self.whitelist.is_match(name) {
            return HighwayVerdict::UnknownRoadType;
        }
        HighwayVerdict::Accepted
    }
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}
