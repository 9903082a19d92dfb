//! Page catalog and dataset configuration.
//!
//! Pages are a closed enum resolved through static tables; nothing is
//! looked up or loaded by name at runtime.

use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds the dataset files.
pub const DATA_DIR_ENV: &str = "PATHWAY_EXPLORER_DATA_DIR";

/// How one dataset file is presented and filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Name used in headings and export file names.
    pub name: &'static str,
    pub file: &'static str,
    /// Multiselect columns; also the identifier columns kept by the year filter.
    pub filter_columns: &'static [&'static str],
    pub remove_columns: &'static [&'static str],
    pub year_filter: bool,
    pub median_chart: bool,
}

pub const POWER_SECTOR: DatasetConfig = DatasetConfig {
    name: "Power-Sector",
    file: "Power Sector.xlsx",
    filter_columns: &["Scenario", "Metric", "Unit"],
    remove_columns: &[],
    year_filter: true,
    median_chart: true,
};

/// Eligible scenarios browsed on the Reference page.
pub const ELIGIBLE_SCENARIOS: DatasetConfig = DatasetConfig {
    name: "Document",
    file: "Alldata.xlsx",
    filter_columns: &["Model", "Scenario", "Region", "Variable"],
    remove_columns: &[],
    year_filter: false,
    median_chart: false,
};

/// Phase-out criteria shown in full on the Reference page.
pub const CRITERIA: DatasetConfig = DatasetConfig {
    name: "Criteria",
    file: "Phase-Out.xlsx",
    filter_columns: &["Model", "Scenario", "Region", "Variable"],
    remove_columns: &[],
    year_filter: false,
    median_chart: false,
};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    PowerGeneration,
    OtherIndustries,
    PulpPaper,
    OilGas,
    Rail,
    AluminumProduction,
    Residential,
    Road,
    Cement,
    Commercial,
    Aviation,
    Steel,
    Chemical,
    Flag,
    ApparelFootwear,
    FinancialInstitution,
    OtherSector,
}

/// Static description of a sector tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorInfo {
    pub title: &'static str,
    pub pathway: &'static str,
    pub metrics: &'static [&'static str],
    /// Tile colour as RGB.
    pub color: [u8; 3],
    /// Home-page column (0, 1 or 2).
    pub tile_column: usize,
    /// `None` while the sector page is under construction.
    pub dataset: Option<DatasetConfig>,
}

const BLUE: [u8; 3] = [0x6F, 0xA8, 0xDC];
const ORANGE: [u8; 3] = [0xD7, 0x79, 0x32];
const PINK: [u8; 3] = [0xC2, 0x7B, 0xA0];

const fn tile(
    title: &'static str,
    pathway: &'static str,
    metrics: &'static [&'static str],
    color: [u8; 3],
    tile_column: usize,
) -> SectorInfo {
    SectorInfo {
        title,
        pathway,
        metrics,
        color,
        tile_column,
        dataset: None,
    }
}

impl Sector {
    pub const ALL: [Sector; 17] = [
        Sector::PowerGeneration,
        Sector::OtherIndustries,
        Sector::PulpPaper,
        Sector::OilGas,
        Sector::Rail,
        Sector::AluminumProduction,
        Sector::Residential,
        Sector::Road,
        Sector::Cement,
        Sector::Commercial,
        Sector::Aviation,
        Sector::Steel,
        Sector::Chemical,
        Sector::Flag,
        Sector::ApparelFootwear,
        Sector::FinancialInstitution,
        Sector::OtherSector,
    ];

    pub fn info(self) -> SectorInfo {
        match self {
            Sector::PowerGeneration => SectorInfo {
                dataset: Some(POWER_SECTOR),
                ..tile("Power Generation", "IEA NZE, IPCC", &["tCO2e", "tCO2/MWh", "% Zero Carbon Capacity"], BLUE, 0)
            },
            Sector::OtherIndustries => tile("Other Industries", "IEA NZE, IPCC", &["tCO2e", "tCO2/tonne"], BLUE, 1),
            Sector::PulpPaper => tile("Pulp & Paper", "IEA NZE, IPCC", &["tCO2e", "tCO2/tonne"], BLUE, 2),
            Sector::OilGas => tile("Oil & Gas", "IPCC", &["tCO2e", "tCO2e/boe"], BLUE, 0),
            Sector::Rail => tile("Rail", "IEA NZE", &["tCO2e", "tCO2/tonne.km"], ORANGE, 1),
            Sector::AluminumProduction => tile("Aluminum Production", "IEA NZE 2021", &["tCO2e", "tCO2/tonne"], ORANGE, 2),
            Sector::Residential => tile("Residential", "CREEM", &["tCO2e", "tCO2/m2"], ORANGE, 0),
            Sector::Road => tile("Road", "IEA NZE", &["tCO2e", "tCO2/tonne.km"], ORANGE, 1),
            Sector::Cement => tile("Cement", "IEA NZE 2021", &["tCO2e", "tCO2/tonne"], ORANGE, 2),
            Sector::Commercial => tile("Commercial", "CREEM", &["tCO2e", "tCO2/m2"], ORANGE, 0),
            Sector::Aviation => tile("Aviation", "IEA NZE", &["tCO2e", "tCO2/tonne.km"], ORANGE, 1),
            Sector::Steel => tile("Steel", "IEA NZE", &["tCO2e", "tCO2/tonne"], ORANGE, 2),
            Sector::Chemical => tile("Chemical", "IEA NZE", &["tCO2e", "tCO2/tonne"], ORANGE, 0),
            Sector::Flag => tile("FLAG", "IPCC", &["tCO2e", "tCO2/m3", "tCO2/freshweight"], ORANGE, 1),
            Sector::ApparelFootwear => tile("Apparel & Footwear", "cross sector", &["tCO2e", "tCO2/MWh"], PINK, 1),
            Sector::FinancialInstitution => tile("Financial Institution", "cross sector", &["tCO2e", "tCO2/MWh"], PINK, 2),
            Sector::OtherSector => tile("Other Sector", "", &[], PINK, 0),
        }
    }
}

/// Top-level navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    Reference,
    Sector(Sector),
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Reference => "Reference",
            Page::Sector(s) => s.info().title,
        }
    }

    /// Resolve a page by its title, e.g. from a link or saved selection.
    pub fn from_title(title: &str) -> Option<Page> {
        let title = title.trim();
        match title {
            "Home" => Some(Page::Home),
            "Reference" => Some(Page::Reference),
            _ => Sector::ALL
                .into_iter()
                .find(|s| s.info().title == title)
                .map(Page::Sector),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Read [`DATA_DIR_ENV`], falling back to the working directory.
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => AppConfig {
                data_dir: PathBuf::from(dir),
            },
            _ => AppConfig::default(),
        }
    }

    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        AppConfig {
            data_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dataset_path(&self, dataset: &DatasetConfig) -> PathBuf {
        self.data_dir.join(dataset.file)
    }
}
