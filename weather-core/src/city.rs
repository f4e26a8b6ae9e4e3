//! City name normalization.
//!
//! The CWA county-level datasets key every location by its official
//! Traditional Chinese name (`臺北市`, `花蓮縣`, ...). Visitors and the IP
//! geolocation service spell these many ways: with or without the
//! `市`/`縣` suffix, with `台` instead of `臺`, or romanized. Every
//! spelling resolves to exactly one canonical name here.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical name used whenever the input is not recognised.
pub const DEFAULT_LOCATION: &str = "臺北市";

/// A county or city served by the county-level forecast dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    /// Official name as it appears in the upstream `LocationName` field.
    pub canonical: &'static str,
    pub region: Region,
    /// Romanized spellings, matched case-insensitively.
    pub romanized: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    North,
    Central,
    South,
    East,
    Islands,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::North => "北部",
            Region::Central => "中部",
            Region::South => "南部",
            Region::East => "東部",
            Region::Islands => "離島",
        }
    }

    pub const fn all() -> &'static [Region] {
        &[Region::North, Region::Central, Region::South, Region::East, Region::Islands]
    }
}

// Cities (市) come before the counties sharing their short name, so that
// `新竹` and `嘉義` resolve to the city.
pub const SUPPORTED_CITIES: &[City] = &[
    City { canonical: "臺北市", region: Region::North, romanized: &["taipei", "taipei city"] },
    City { canonical: "新北市", region: Region::North, romanized: &["new taipei", "new taipei city"] },
    City { canonical: "基隆市", region: Region::North, romanized: &["keelung", "keelung city"] },
    City { canonical: "桃園市", region: Region::North, romanized: &["taoyuan", "taoyuan city"] },
    City { canonical: "新竹市", region: Region::North, romanized: &["hsinchu", "hsinchu city"] },
    City { canonical: "新竹縣", region: Region::North, romanized: &["hsinchu county"] },
    City { canonical: "宜蘭縣", region: Region::North, romanized: &["yilan", "yilan county"] },
    City { canonical: "苗栗縣", region: Region::Central, romanized: &["miaoli", "miaoli county"] },
    City { canonical: "臺中市", region: Region::Central, romanized: &["taichung", "taichung city"] },
    City { canonical: "彰化縣", region: Region::Central, romanized: &["changhua", "changhua county"] },
    City { canonical: "南投縣", region: Region::Central, romanized: &["nantou", "nantou county"] },
    City { canonical: "雲林縣", region: Region::Central, romanized: &["yunlin", "yunlin county"] },
    City { canonical: "嘉義市", region: Region::South, romanized: &["chiayi", "chiayi city"] },
    City { canonical: "嘉義縣", region: Region::South, romanized: &["chiayi county"] },
    City { canonical: "臺南市", region: Region::South, romanized: &["tainan", "tainan city"] },
    City { canonical: "高雄市", region: Region::South, romanized: &["kaohsiung", "kaohsiung city"] },
    City { canonical: "屏東縣", region: Region::South, romanized: &["pingtung", "pingtung county"] },
    City { canonical: "花蓮縣", region: Region::East, romanized: &["hualien", "hualien county"] },
    City { canonical: "臺東縣", region: Region::East, romanized: &["taitung", "taitung county"] },
    City { canonical: "澎湖縣", region: Region::Islands, romanized: &["penghu", "penghu county"] },
    City { canonical: "金門縣", region: Region::Islands, romanized: &["kinmen", "kinmen county"] },
    City { canonical: "連江縣", region: Region::Islands, romanized: &["lienchiang", "lienchiang county", "matsu"] },
];

static ALIASES: LazyLock<HashMap<String, &'static str>> = LazyLock::new(build_aliases);

fn build_aliases() -> HashMap<String, &'static str> {
    let mut map = HashMap::new();

    // Identity entries first: a canonical name must never be shadowed.
    for city in SUPPORTED_CITIES {
        map.insert(city.canonical.to_string(), city.canonical);
    }

    for city in SUPPORTED_CITIES {
        let short = city.canonical.trim_end_matches(['市', '縣']);
        for spelling in [city.canonical, short] {
            map.entry(spelling.to_string()).or_insert(city.canonical);
            map.entry(spelling.replace('臺', "台")).or_insert(city.canonical);
        }
        for name in city.romanized {
            map.entry(name.to_string()).or_insert(city.canonical);
        }
    }

    map
}

/// Resolve any spelling of a supported city to its canonical upstream name.
///
/// Never fails: unknown or empty input yields [`DEFAULT_LOCATION`].
pub fn canonical_name(input: &str) -> &'static str {
    lookup(input).unwrap_or(DEFAULT_LOCATION)
}

/// Like [`canonical_name`] but reports a miss instead of substituting the default.
pub fn lookup(input: &str) -> Option<&'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    ALIASES
        .get(trimmed)
        .or_else(|| ALIASES.get(&trimmed.to_lowercase()))
        .copied()
}

/// Supported cities grouped by region, in display order.
pub fn by_region() -> Vec<(Region, Vec<&'static City>)> {
    Region::all()
        .iter()
        .map(|region| {
            let cities = SUPPORTED_CITIES.iter().filter(|c| c.region == *region).collect();
            (*region, cities)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_name_maps_to_itself() {
        for city in SUPPORTED_CITIES {
            assert_eq!(canonical_name(city.canonical), city.canonical);
        }
    }

    #[test]
    fn aliases_of_a_city_share_one_canonical_name() {
        let taipei = ["台北", "台北市", "臺北", "臺北市", "Taipei", "TAIPEI CITY", " 台北市 "];
        for alias in taipei {
            assert_eq!(canonical_name(alias), "臺北市", "alias {alias:?}");
        }

        let taitung = ["台東", "台東縣", "臺東", "臺東縣", "taitung"];
        for alias in taitung {
            assert_eq!(canonical_name(alias), "臺東縣", "alias {alias:?}");
        }
    }

    #[test]
    fn every_generated_alias_round_trips_through_its_canonical_name() {
        for (alias, canonical) in ALIASES.iter() {
            assert_eq!(canonical_name(alias), *canonical);
            assert_eq!(canonical_name(canonical), *canonical);
        }
    }

    #[test]
    fn ambiguous_short_names_prefer_the_city() {
        assert_eq!(canonical_name("新竹"), "新竹市");
        assert_eq!(canonical_name("嘉義"), "嘉義市");
        assert_eq!(canonical_name("新竹縣"), "新竹縣");
        assert_eq!(canonical_name("嘉義縣"), "嘉義縣");
    }

    #[test]
    fn unknown_or_empty_input_falls_back_to_default() {
        for input in ["", "   ", "東京", "Springfield", "台北縣"] {
            assert_eq!(canonical_name(input), DEFAULT_LOCATION, "input {input:?}");
        }
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn regions_cover_every_supported_city() {
        let total: usize = by_region().iter().map(|(_, cities)| cities.len()).sum();
        assert_eq!(total, SUPPORTED_CITIES.len());
        assert_eq!(SUPPORTED_CITIES.len(), 22);
    }
}
