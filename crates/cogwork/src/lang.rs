//! Russian grammar and duration formatting helpers.
//!
//! Counted nouns in Russian take one of three forms depending on the count;
//! [`pluralize`] picks the right one and [`formatted_duration`] builds on it
//! to render second counts as human text.

/// Picks the grammatical form of a counted noun and returns
/// `"<count> <form>"`.
///
/// The caller supplies the three Russian forms: nominative singular
/// (`"день"`), genitive singular (`"дня"`) and genitive plural (`"дней"`).
/// Counts whose last two digits fall in 11–19 always take the genitive
/// plural; otherwise the last digit decides (1 → nominative singular,
/// 2–4 → genitive singular, the rest → genitive plural).
///
/// Counts are unsigned, so the negative case cannot arise; callers holding
/// signed platform values must clamp before calling.
pub fn pluralize(count: u64, nom_sing: &str, gen_sing: &str, gen_pl: &str) -> String {
    let form = if (11..=19).contains(&(count % 100)) {
        gen_pl
    } else {
        match count % 10 {
            1 => nom_sing,
            2..=4 => gen_sing,
            _ => gen_pl,
        }
    };

    format!("{count} {form}")
}

/// Renders a second count as `"N дней, N часов, N минут, N секунд"`,
/// skipping zero-valued units.
///
/// Decomposition is pure integer division, so no unit ever absorbs the
/// remainder of another. An all-zero input renders as the empty string.
pub fn formatted_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = total_seconds % 86_400 / 3_600;
    let minutes = total_seconds % 3_600 / 60;
    let seconds = total_seconds % 60;

    let units = [
        (days, ["день", "дня", "дней"]),
        (hours, ["час", "часа", "часов"]),
        (minutes, ["минута", "минуты", "минут"]),
        (seconds, ["секунда", "секунды", "секунд"]),
    ];

    units
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, [nom, r#gen, pl])| pluralize(*value, nom, r#gen, pl))
        .collect::<Vec<_>>()
        .join(", ")
}
