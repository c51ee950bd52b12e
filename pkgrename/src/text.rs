//! Case-insensitive word matching and title casing.

/// Words whose spelling survives [`mixed_case()`].
const SPECIAL_WORDS: &[&str] = &[
    // Roman numerals
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI", "XVII", "XVIII", "XVIX", "XX",
    // Games
    "20XX", "2Dark", "2K", "2K14", "2K15", "2K16", "2K17", "2K18", "2K19", "2K20", "2K21", "2K22",
    "2X", "3D", "4K", "ABC", "ACA", "ADR1FT", "AER", "AI", "AO", "ARK", "ATV", "AVICII",
    "AdVenture", "AereA", "AeternoBlade", "AnywhereVR", "ArmaGallant", "Avenger iX", "BMX",
    "BaZooka", "BioHazard", "BioShock", "BlazBlue", "BlazeRush", "BloodRayne", "BoxVR",
    "CastleStorm", "ChromaGun", "CrossCode", "CruisinMix", "DC", "DCL", "DEX", "DG2", "DX",
    "DJMax", "DLC", "DS", "DUB", "DWVR", "DarkWatch", "DayZ", "DmC", "DreamMix", "DreamWorks",
    "EA", "EBKore", "ECHO", "EFootball", "EP", "ESP", "ESPN", "EVE", "EX", "EXA", "EarthNight",
    "FEZ", "FIA", "FIFA", "F.I.S.T.", "FX2", "FX3", "FantaVision", "Fate/Extella", "FightN",
    "FighterZ", "FlOw", "FlatOut", "GI", "GODS", "GP", "Gris", "GU", "GoldenEye", "GreedFall",
    "HD", "HOA", "HiQ", "Hitman GO", "ICO", "IF", "InFamous", "IxSHE", "JJ", "JoJos", "JoyRide",
    "JumpJet", "KO", "KOI", "KeyWe", "KickBeat", "LA Cops", "LittleBigPlanet", "LocoRoco",
    "LoveR Kiss", "MLB", "MS", "MV", "MX", "MXGP", "MalFunction", "MasterCube", "McIlroy",
    "McMorris", "MechWarrior", "MediEvil", "MegaDrive", "MotoGP", "MudRunner", "NASCAR", "NBA",
    "N.E.R.O.", "NESTS", "NFL", "NG", "NHL", "NT", "NY", "NecroDancer", "NeoGeo", "NeoWave",
    "NeuroVoider", "NieR", "OG", "OK", "OMG", "OhShape", "OlliOlli", "OutRun", "OwlBoy", "PAW",
    "PES", "PGA", "PS2", "PS4", "PSN", "PaRappa", "PixARK", "PixelJunk", "PlayStation",
    "Project CARS", "ProStreet", "QuiVr", "RBI", "REV", "RICO", "RIGS", "RiME", "RPG",
    "RemiLore", "RiMS", "RollerCoaster", "Romancing SaGa", "RyoRaiRai", "SD", "SG/ZH", "SH1FT3R",
    "SNES", "SNK", "SSX", "SVC", "SaGa Frontier", "SaGa Scarlet", "SkullGirls", "SkyScrappers",
    "SmackDown", "SnowRunner", "SoulCalibur", "SpeedRunners", "SpinMaster", "SquarePants",
    "SteamWorld", "SuperChargers", "SuperEpic", "TMNT", "Tron RUN/r", "TT", "TV", "ToeJam",
    "TowerFall", "TrackMania", "TrainerVR", "UEFA", "UFC", "UN", "UNO", "UglyDolls", "UnMetal",
    "VA", "VFR", "VIIR", "VR", "VRobot", "VRog", "VirZOOM", "WMD", "WRC", "WWE", "WWII",
    "WindJammers", "XCOM", "XD", "XL", "XXL", "YU-NO", "YoRHa", "ZX", "eSports", "eX+", "pFBA",
    "pNES", "pSNES", "reQuest", "tRrLM();", "theHunter", "vs",
];

/// Characters after which [`mixed_case()`] starts a new word.
const WORD_STARTERS: &str = ":-;~_1234567890";

/// Returns the byte offset of the first case-insensitive occurrence of `word`
/// in `text` that is not part of a longer alphanumeric run.
#[must_use]
pub fn find_word(text: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }

    let haystack = text.to_ascii_lowercase();
    let needle = word.to_ascii_lowercase();
    let bytes = haystack.as_bytes();

    haystack.match_indices(&needle).map(|(pos, _)| pos).find(|&pos| {
        let end = pos + needle.len();
        let before = pos == 0 || !bytes[pos - 1].is_ascii_alphanumeric();
        let after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        before && after
    })
}

/// Returns `true` if `text` contains `word` as a whole word, ignoring case.
#[must_use]
pub fn contains_word(text: &str, word: &str) -> bool {
    find_word(text, word).is_some()
}

/// Returns `true` if `text` contains `needle`, ignoring ASCII case.
#[must_use]
pub fn contains_ignore_case(text: &str, needle: &str) -> bool {
    !needle.is_empty()
        && text
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
}

/// Replaces every whole-word occurrence of `word` (ignoring case).
#[must_use]
pub fn replace_word(text: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = find_word(rest, word) {
        out.push_str(&rest[..pos]);
        out.push_str(replacement);
        rest = &rest[pos + word.len()..];
    }
    out.push_str(rest);
    out
}

/// Converts a title to mixed case.
///
/// Every word starts upper case and continues lower case, then well-known
/// words with unusual spelling (`PS4`, `FIFA`, Roman numerals, ...) are put
/// back the way they are written.
#[must_use]
pub fn mixed_case(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev: Option<char> = None;

    for c in title.chars() {
        let starts_word = match prev {
            None => true,
            Some(p) => p.is_ascii_whitespace() || WORD_STARTERS.contains(p),
        };
        out.push(if starts_word {
            c.to_ascii_uppercase()
        } else {
            c.to_ascii_lowercase()
        });
        prev = Some(c);
    }

    SPECIAL_WORDS
        .iter()
        .fold(out, |title, word| replace_word(&title, word, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_boundaries_are_alphanumeric() {
        assert!(contains_word("game_bp_fixed", "bp"));
        assert!(contains_word("game (BP).pkg", "bp"));
        assert!(contains_word("bp", "BP"));
        assert!(!contains_word("bpm", "bp"));
        assert!(!contains_word("abp", "bp"));
        assert!(!contains_word("anything", ""));
        assert_eq!(find_word("bpx bp", "bp"), Some(4));
    }

    #[test]
    fn replace_word_keeps_other_text() {
        assert_eq!(replace_word("Fifa 22 fifaa FIFA", "fifa", "FIFA"), "FIFA 22 fifaa FIFA");
        assert_eq!(replace_word("nothing here", "x", "y"), "nothing here");
    }

    #[test]
    fn mixed_case_titles() {
        assert_eq!(mixed_case("THE WITCHER 3: WILD HUNT"), "The Witcher 3: Wild Hunt");
        assert_eq!(mixed_case("final fantasy xii"), "Final Fantasy XII");
        assert_eq!(mixed_case("nba 2k22 ps4 edition"), "NBA 2K22 PS4 Edition");
        assert_eq!(mixed_case("spider-man"), "Spider-Man");
        assert_eq!(mixed_case(""), "");
    }

    #[test]
    fn substring_search_ignores_case() {
        assert!(contains_ignore_case("Fixed by FXD team", "fxd"));
        assert!(!contains_ignore_case("abc", ""));
    }
}
