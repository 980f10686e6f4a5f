use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Bracketed annotations like `[Lvl 80]` carry no pricing identity.
    static ref BRACKETED: Regex = Regex::new(r"\[[^\]]*\]").unwrap();
}

/// Cosmetic modifier tokens (reforge prefixes, star glyphs) stripped from
/// item names before grouping. Tokens are non-overlapping substrings, so
/// removal order does not change the result.
pub const REFORGES: &[&str] = &[
    " ✦", "⚚ ", " ✪", "✪", "Stiff ", "Lucky ", "Jerry's ", "Dirty ", "Fabled ", "Suspicious ",
    "Gilded ", "Warped ", "Withered ", "Bulky ", "Stellar ", "Heated ", "Ambered ", "Fruitful ",
    "Magnetic ", "Fleet ", "Mithraic ", "Auspicious ", "Refined ", "Headstrong ", "Precise ",
    "Spiritual ", "Moil ", "Blessed ", "Toil ", "Bountiful ", "Candied ", "Submerged ",
    "Reinforced ", "Cubic ", "Undead ", "Ridiculous ", "Necrotic ", "Spiked ", "Jaded ",
    "Loving ", "Perfect ", "Renowned ", "Giant ", "Empowered ", "Ancient ", "Sweet ", "Silky ",
    "Bloody ", "Shaded ", "Gentle ", "Odd ", "Fast ", "Fair ", "Epic ", "Sharp ", "Heroic ",
    "Spicy ", "Legendary ", "Deadly ", "Fine ", "Grand ", "Hasty ", "Neat ", "Rapid ", "Unreal ",
    "Awkward ", "Rich ", "Clean ", "Fierce ", "Heavy ", "Light ", "Mythic ", "Pure ", "Smart ",
    "Titanic ", "Wise ", "Bizarre ", "Itchy ", "Ominous ", "Pleasant ", "Pretty ", "Shiny ",
    "Simple ", "Strange ", "Vivid ", "Godly ", "Demonic ", "Forceful ", "Hurtful ", "Keen ",
    "Strong ", "Superior ", "Unpleasant ", "Zealous ",
];

/// Canonicalize an item name + rarity tier into the grouping key under
/// which prices for "the same item" are compared. Idempotent: normalizing
/// an already-normalized key (with an empty tier) returns it unchanged.
pub fn normalize(item_name: &str, tier: &str) -> String {
    let mut key = format!("{}{}", BRACKETED.replace_all(item_name, ""), tier);
    for token in REFORGES {
        if key.contains(token) {
            key = key.replace(token, "");
        }
    }
    key
}
