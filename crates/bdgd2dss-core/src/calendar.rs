use crate::case::Artifact;

/// Day types of the Brazilian regulatory calendar: útil, sábado, domingo.
pub const DAY_TYPES: [&str; 3] = ["DU", "SA", "DO"];

pub const BASE_DAY_TYPE: &str = "DU";
pub const BASE_MONTH: &str = "01";

pub fn months() -> impl Iterator<Item = String> {
    (1..=12).map(|m| format!("{m:02}"))
}

/// Rewrites the day-type and month tokens of a `(DU, 01)` base text.
/// Applies to both artifact names and their contents; anything outside the
/// two tokens stays untouched.
pub fn substitute(text: &str, day_type: &str, month: &str) -> String {
    text.replace("_DU", &format!("_{day_type}"))
        .replace("_01", &format!("_{month}"))
}

/// Expands every calendar-varying artifact of `base` into its 36
/// (day-type, month) variants; static artifacts pass through once, in their
/// original position.
pub fn expand(base: &[Artifact]) -> Vec<Artifact> {
    let mut out = Vec::new();

    for artifact in base.iter().filter(|a| !a.role.is_calendar_varying()) {
        out.push(artifact.clone());
    }

    for day_type in DAY_TYPES {
        for month in months() {
            for artifact in base.iter().filter(|a| a.role.is_calendar_varying()) {
                out.push(Artifact {
                    kind: artifact.kind,
                    role: artifact.role,
                    name: substitute(&artifact.name, day_type, &month),
                    content: substitute(&artifact.content, day_type, &month),
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{ArtifactKind, CalendarRole};

    #[test]
    fn substitution_touches_only_the_tokens() {
        let out = substitute("Cargas_BT_DU_01.dss", "SA", "07");
        assert_eq!(out, "Cargas_BT_SA_07.dss");

        let content = substitute(r#"daily="5_DU" kw=1.013"#, "DO", "11");
        assert_eq!(content, r#"daily="5_DO" kw=1.013"#);
    }

    #[test]
    fn expansion_yields_exactly_36_variants_per_role() {
        let base = vec![
            Artifact::new_static(ArtifactKind::Circuit, "Circuito.dss", "x".into()),
            Artifact::new_calendar(
                ArtifactKind::Load,
                CalendarRole::LoadLv,
                "Cargas_BT_DU_01.dss",
                r#"New "Load.BT_1" daily="5_DU""#.into(),
            ),
            Artifact::new_calendar(
                ArtifactKind::Master,
                CalendarRole::Master,
                "Master_DU_01",
                "Redirect \"Cargas_BT_DU_01.dss\"\n".into(),
            ),
        ];

        let expanded = expand(&base);
        assert_eq!(expanded.len(), 1 + 36 * 2);

        let masters: Vec<_> = expanded
            .iter()
            .filter(|a| a.role == CalendarRole::Master)
            .collect();
        assert_eq!(masters.len(), 36);

        let mut names: Vec<_> = masters.iter().map(|a| a.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 36, "variant names must be distinct");

        // Each variant is the base content with the tokens rewritten.
        let sa_05 = masters
            .iter()
            .find(|a| a.name == "Master_SA_05")
            .expect("SA/05 master variant");
        assert!(sa_05.content.contains("Cargas_BT_SA_05.dss"));

        // The (DU, 01) base itself is one of the variants.
        assert!(masters.iter().any(|a| a.name == "Master_DU_01"));
    }
}
