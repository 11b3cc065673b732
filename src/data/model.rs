use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Species / Sex – closed categorical columns
// ---------------------------------------------------------------------------

/// Penguin species present in the Palmer archipelago data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Species {
    Adelie,
    Chinstrap,
    Gentoo,
}

impl Species {
    /// All species, in the order the controls list them.
    pub const ALL: [Species; 3] = [Species::Adelie, Species::Gentoo, Species::Chinstrap];

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Adelie => "Adelie",
            Species::Chinstrap => "Chinstrap",
            Species::Gentoo => "Gentoo",
        }
    }

    /// Every species selected – the per-session default.
    pub fn all() -> BTreeSet<Species> {
        Self::ALL.into_iter().collect()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Species {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The upstream CSV uses the bare name, some exports use the full
        // binomial label ("Adelie Penguin (Pygoscelis adeliae)").
        let head = s.trim().split_whitespace().next().unwrap_or("");
        match head.to_ascii_lowercase().as_str() {
            "adelie" => Ok(Species::Adelie),
            "chinstrap" => Ok(Species::Chinstrap),
            "gentoo" => Ok(Species::Gentoo),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Sex::Female),
            "male" | "m" => Ok(Sex::Male),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// NumericAttribute – the measurement columns a chart can be driven by
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum NumericAttribute {
    #[default]
    BillLengthMm,
    BillDepthMm,
    FlipperLengthMm,
    BodyMassG,
}

impl NumericAttribute {
    pub const ALL: [NumericAttribute; 4] = [
        NumericAttribute::BillLengthMm,
        NumericAttribute::BillDepthMm,
        NumericAttribute::FlipperLengthMm,
        NumericAttribute::BodyMassG,
    ];

    /// Column name in the source data, also used as the axis label.
    pub fn column(self) -> &'static str {
        match self {
            NumericAttribute::BillLengthMm => "bill_length_mm",
            NumericAttribute::BillDepthMm => "bill_depth_mm",
            NumericAttribute::FlipperLengthMm => "flipper_length_mm",
            NumericAttribute::BodyMassG => "body_mass_g",
        }
    }

    pub fn value(self, row: &Row) -> f64 {
        match self {
            NumericAttribute::BillLengthMm => row.bill_length_mm,
            NumericAttribute::BillDepthMm => row.bill_depth_mm,
            NumericAttribute::FlipperLengthMm => row.flipper_length_mm,
            NumericAttribute::BodyMassG => row.body_mass_g,
        }
    }
}

impl fmt::Display for NumericAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for NumericAttribute {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.column() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Row – one penguin observation
// ---------------------------------------------------------------------------

/// A single fully-populated observation. Rows with missing cells never make
/// it past the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub species: Species,
    pub island: String,
    pub bill_length_mm: f64,
    pub bill_depth_mm: f64,
    pub flipper_length_mm: f64,
    pub body_mass_g: f64,
    pub sex: Sex,
    pub year: i32,
}

impl Row {
    /// Column headers in display order, matching [`Row::cells`].
    pub const COLUMNS: [&'static str; 8] = [
        "species",
        "island",
        "bill_length_mm",
        "bill_depth_mm",
        "flipper_length_mm",
        "body_mass_g",
        "sex",
        "year",
    ];

    /// Format every column for tabular display.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.species.to_string(),
            self.island.clone(),
            format!("{:.1}", self.bill_length_mm),
            format!("{:.1}", self.bill_depth_mm),
            format!("{:.0}", self.flipper_length_mm),
            format!("{:.0}", self.body_mass_g),
            self.sex.to_string(),
            self.year.to_string(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned table
// ---------------------------------------------------------------------------

/// The loaded, cleaned dataset. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All rows in source order.
    pub rows: Vec<Row>,
    /// Island values in order of first appearance.
    pub islands: Vec<String>,
}

impl Dataset {
    /// Build the island index from the loaded rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut islands: Vec<String> = Vec::new();
        for row in &rows {
            if !islands.contains(&row.island) {
                islands.push(row.island.clone());
            }
        }
        Dataset { rows, islands }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Island pre-selected for a fresh session.
    pub fn default_island(&self) -> Option<&str> {
        self.islands.first().map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn row(species: Species, island: &str, bill_length_mm: f64, body_mass_g: f64) -> Row {
        Row {
            species,
            island: island.to_string(),
            bill_length_mm,
            bill_depth_mm: 18.0,
            flipper_length_mm: 190.0,
            body_mass_g,
            sex: Sex::Female,
            year: 2007,
        }
    }

    /// The two-row scenario dataset.
    pub fn two_rows() -> Dataset {
        Dataset::from_rows(vec![
            row(Species::Adelie, "Torgersen", 39.1, 3750.0),
            row(Species::Gentoo, "Biscoe", 46.1, 5000.0),
        ])
    }

    /// A slightly larger mix covering every species and island.
    pub fn mixed() -> Dataset {
        Dataset::from_rows(vec![
            row(Species::Adelie, "Torgersen", 39.1, 3750.0),
            row(Species::Adelie, "Biscoe", 37.8, 3400.0),
            row(Species::Gentoo, "Biscoe", 46.1, 5000.0),
            row(Species::Chinstrap, "Dream", 46.5, 3500.0),
            row(Species::Adelie, "Dream", 39.5, 3800.0),
            row(Species::Gentoo, "Biscoe", 50.0, 5700.0),
            row(Species::Adelie, "Torgersen", 40.3, 3250.0),
            row(Species::Chinstrap, "Dream", 50.0, 3900.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn islands_keep_first_appearance_order() {
        let ds = fixtures::mixed();
        assert_eq!(ds.islands, vec!["Torgersen", "Biscoe", "Dream"]);
        assert_eq!(ds.default_island(), Some("Torgersen"));
    }

    #[test]
    fn species_parses_short_and_long_labels() {
        assert_eq!("Adelie".parse::<Species>().unwrap(), Species::Adelie);
        assert_eq!(
            "Gentoo penguin (Pygoscelis papua)".parse::<Species>().unwrap(),
            Species::Gentoo
        );
        assert!("Emperor".parse::<Species>().is_err());
    }

    #[test]
    fn attribute_round_trips_through_column_name() {
        for attr in NumericAttribute::ALL {
            assert_eq!(attr.column().parse::<NumericAttribute>().unwrap(), attr);
        }
        assert!("beak_size".parse::<NumericAttribute>().is_err());
    }

    #[test]
    fn cells_follow_column_order() {
        let row = fixtures::row(Species::Chinstrap, "Dream", 46.5, 3500.0);
        let cells = row.cells();
        assert_eq!(cells.len(), Row::COLUMNS.len());
        assert_eq!(cells[0], "Chinstrap");
        assert_eq!(cells[1], "Dream");
        assert_eq!(cells[2], "46.5");
        assert_eq!(cells[5], "3500");
    }
}
