//! Derived weather conditions.
//!
//! Everything here is a pure function of already-extracted values; the
//! wall-clock hour is passed in by the caller.

pub const RAIN_CODE: &str = "10";
pub const SNOW_CODE: &str = "13";
pub const CLEAR_CODE: &str = "01";
pub const CLOUDY_CODE: &str = "02";

const RAIN_GLYPH: char = '雨';
const SNOW_GLYPH: char = '雪';
const CLEAR_GLYPH: char = '晴';
const CLOUD_GLYPHS: [char; 2] = ['雲', '陰'];

/// Above this pop the weather code is forced to rain.
const RAIN_CODE_POP_THRESHOLD: u8 = 60;
/// Above this pop the scene is considered raining.
const RAINING_POP_THRESHOLD: u8 = 70;
/// Strictly above this wind speed (m/s) the scene is windy.
const WINDY_SPEED_THRESHOLD: f64 = 10.0;
const DAY_START_HOUR: u32 = 6;
const DAY_END_HOUR: u32 = 18;
const WINTER_BELOW_C: i32 = 15;
const SUNNY_ABOVE_C: i32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyInput<'a> {
    pub description: &'a str,
    pub weather_code: &'a str,
    pub temperature: i32,
    pub wind_speed: f64,
    pub pop: u8,
    /// Local wall-clock hour, 0..=23.
    pub hour: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditions {
    pub weather_code: String,
    pub is_day: bool,
    pub is_windy: bool,
    pub is_raining: bool,
    pub character: CharacterState,
}

/// Outfit of the on-screen character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterState {
    Rain,
    Winter,
    Sunny,
    Comfort,
}

impl CharacterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterState::Rain => "rain",
            CharacterState::Winter => "winter",
            CharacterState::Sunny => "sunny",
            CharacterState::Comfort => "comfort",
        }
    }
}

pub fn classify(input: &ClassifyInput<'_>) -> Conditions {
    let weather_code = refine_weather_code(input.description, input.weather_code, input.pop);
    let character = character_state(&weather_code, input.temperature);

    Conditions {
        is_day: is_day(input.hour),
        is_windy: is_windy(input.wind_speed),
        is_raining: is_raining(input.description, input.pop),
        weather_code,
        character,
    }
}

/// Map a description onto one of the coarse weather buckets.
///
/// Rain wins over snow, snow over clear, clear over cloudy. Descriptions with
/// none of the glyphs keep the upstream code.
pub fn refine_weather_code(description: &str, upstream_code: &str, pop: u8) -> String {
    let code = if description.contains(RAIN_GLYPH) || pop > RAIN_CODE_POP_THRESHOLD {
        RAIN_CODE
    } else if description.contains(SNOW_GLYPH) {
        SNOW_CODE
    } else if description.contains(CLEAR_GLYPH) {
        CLEAR_CODE
    } else if description.contains(CLOUD_GLYPHS) {
        CLOUDY_CODE
    } else {
        upstream_code
    };
    code.to_string()
}

// NOTE: uses the server's local hour, not the target city's solar time.
pub fn is_day(hour: u32) -> bool {
    (DAY_START_HOUR..DAY_END_HOUR).contains(&hour)
}

pub fn is_windy(wind_speed: f64) -> bool {
    wind_speed > WINDY_SPEED_THRESHOLD
}

pub fn is_raining(description: &str, pop: u8) -> bool {
    pop > RAINING_POP_THRESHOLD || description.contains(RAIN_GLYPH)
}

pub fn character_state(weather_code: &str, temperature: i32) -> CharacterState {
    if weather_code == RAIN_CODE {
        CharacterState::Rain
    } else if weather_code == SNOW_CODE || temperature < WINTER_BELOW_C {
        CharacterState::Winter
    } else if temperature > SUNNY_ABOVE_C {
        CharacterState::Sunny
    } else {
        CharacterState::Comfort
    }
}

/// Hours left before 18:00, or zero at night.
pub fn hours_until_night(hour: u32) -> u32 {
    if is_day(hour) { DAY_END_HOUR - hour } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(description: &'a str, code: &'a str, pop: u8) -> ClassifyInput<'a> {
        ClassifyInput {
            description,
            weather_code: code,
            temperature: 22,
            wind_speed: 3.0,
            pop,
            hour: 12,
        }
    }

    #[test]
    fn rain_glyph_overrides_upstream_code() {
        let c = classify(&input("大雨", "04", 80));
        assert_eq!(c.weather_code, RAIN_CODE);
        assert!(c.is_raining);
        assert_eq!(c.character, CharacterState::Rain);
    }

    #[test]
    fn high_pop_forces_rain_code_even_without_glyph() {
        assert_eq!(refine_weather_code("多雲", "04", 61), RAIN_CODE);
        assert_eq!(refine_weather_code("多雲", "04", 60), CLOUDY_CODE);
    }

    #[test]
    fn precedence_is_rain_snow_clear_cloudy() {
        assert_eq!(refine_weather_code("雨夾雪", "23", 0), RAIN_CODE);
        assert_eq!(refine_weather_code("陰有雪", "42", 0), SNOW_CODE);
        assert_eq!(refine_weather_code("晴時多雲", "02", 0), CLEAR_CODE);
        assert_eq!(refine_weather_code("陰天", "07", 0), CLOUDY_CODE);
        assert_eq!(refine_weather_code("多雲", "04", 0), CLOUDY_CODE);
    }

    #[test]
    fn unknown_description_keeps_upstream_code() {
        assert_eq!(refine_weather_code("有霧", "39", 10), "39");
    }

    #[test]
    fn windy_threshold_is_strict() {
        assert!(!is_windy(10.0));
        assert!(is_windy(10.1));
    }

    #[test]
    fn raining_threshold_is_strict_and_looser_than_code_threshold() {
        assert!(classify(&input("多雲", "04", 71)).is_raining);
        assert!(!classify(&input("多雲", "04", 70)).is_raining);

        // Rain code at 65% but no rain flag yet.
        let c = classify(&input("多雲", "04", 65));
        assert_eq!(c.weather_code, RAIN_CODE);
        assert!(!c.is_raining);
    }

    #[test]
    fn day_is_six_inclusive_to_eighteen_exclusive() {
        assert!(!is_day(5));
        assert!(is_day(6));
        assert!(is_day(17));
        assert!(!is_day(18));
        assert!(!is_day(0));
    }

    #[test]
    fn character_depends_on_code_then_temperature() {
        assert_eq!(character_state(SNOW_CODE, 20), CharacterState::Winter);
        assert_eq!(character_state(CLEAR_CODE, 14), CharacterState::Winter);
        assert_eq!(character_state(CLEAR_CODE, 31), CharacterState::Sunny);
        assert_eq!(character_state(CLEAR_CODE, 30), CharacterState::Comfort);
        assert_eq!(character_state(RAIN_CODE, 35), CharacterState::Rain);
    }

    #[test]
    fn hours_until_night_counts_down_to_eighteen() {
        assert_eq!(hours_until_night(6), 12);
        assert_eq!(hours_until_night(17), 1);
        assert_eq!(hours_until_night(18), 0);
        assert_eq!(hours_until_night(3), 0);
    }
}
