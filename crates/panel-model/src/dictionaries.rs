//! Built-in mapping tables for the natural-hazards panel survey.
//!
//! Tables are constructed on demand and handed to the stages that need them;
//! nothing here is shared mutable state.

use crate::error::{PanelError, Result};
use crate::mapping::{MappedValue, MappingTable};

/// Names accepted by [`builtin_table`].
pub const BUILTIN_TABLES: &[&str] = &[
    "likert",
    "demographics",
    "translations",
    "nh_experience",
    "preference",
];

/// Answer that means "unknown" on the 1-6 scales and is always discarded.
pub const LIKERT_UNKNOWN_SENTINEL: &str = "7";

/// Look up a built-in table by name.
pub fn builtin_table(name: &str) -> Result<MappingTable> {
    match name {
        "likert" => Ok(likert_map()),
        "demographics" => Ok(demographics_map()),
        "translations" => Ok(translation_map()),
        "nh_experience" => Ok(nh_experience_map()),
        "preference" => Ok(preference_map()),
        other => Err(PanelError::invalid_argument(format!(
            "unknown mapping table '{other}', expected one of {}",
            BUILTIN_TABLES.join(", ")
        ))),
    }
}

/// Anchor labels of the 1-6 agreement/likelihood scales.
pub fn likert_map() -> MappingTable {
    let mut table = MappingTable::new("likert");
    for label in [
        "1 - Extremely unlikely",
        "1 - Strongly disagree",
        "1 - Totally unacceptable",
        "1 - Very unlikely",
        "1 - Very difficult",
        "1 - Not worried at all",
    ] {
        table.insert(label, MappedValue::Number(1.0));
    }
    for label in [
        "6 - Totally acceptable",
        "6 - Strongly agree",
        "6 - Very likely",
        "6 - Very easy",
        "6 - Extremely worried",
        "6 - Extremely likely",
    ] {
        table.insert(label, MappedValue::Number(6.0));
    }
    // "I don't now" is a typo present in the exported labels.
    for label in [
        "I don't know",
        "Prefer not to say",
        "I don't now",
        LIKERT_UNKNOWN_SENTINEL,
    ] {
        table.insert(label, MappedValue::Missing);
    }
    table
}

/// Verbatim demographic answers collapsed to census-comparable categories.
pub fn demographics_map() -> MappingTable {
    const NONE: Option<&str> = None;
    MappingTable::from_pairs(
        "demographics",
        [
            // gender
            ("Female", Some("Female")),
            ("Male", Some("Male")),
            ("Non-binary / Other", NONE),
            ("Prefer not to say", NONE),
            // age
            ("18 - 34", Some("18 - 34")),
            ("35 - 49", Some("35 - 49")),
            ("50 or older", Some("50+")),
            // education
            ("No high school diploma", Some("Below Secondary")),
            (
                "Vocational training or apprenticeship",
                Some("Vocational training or apprenticeship"),
            ),
            ("High school diploma", Some("High school diploma")),
            ("Bachelor's degree", Some("University degree")),
            ("Master's degree", Some("University degree")),
            (
                "Doctoral or professional degree (e.g. PhD, MD, JD)",
                Some("University degree"),
            ),
            // income
            ("Less than CHF 50,000", Some("Low")),
            ("CHF 50,000 - CHF 70,000", Some("Low")),
            ("CHF 70,000 - CHF 100,000", Some("Mid")),
            ("CHF 100,001 - CHF 150,000", Some("Mid")),
            ("CHF 150,001 - CHF 250,000", Some("High")),
            ("More than CHF 250,000", Some("High")),
            ("I don't know", NONE),
            // language
            ("Deutsch", Some("German")),
            ("Français", Some("French")),
            ("English", Some("English")),
            ("Italiano", Some("Italian")),
            // region
            ("German-speaking region", Some("German-speaking region")),
            ("Italian-speaking region", Some("Italian-speaking region")),
            ("French-speaking region", Some("French-speaking region")),
            ("Romansh-speaking region", Some("Romansh-speaking region")),
            // party
            ("Social Democratic Party (SP)", Some("Left")),
            ("The Greens (GPS)", Some("Left")),
            ("Green Liberals (GLP)", Some("Liberal")),
            ("The Liberals (FDP)", Some("Liberal")),
            (
                "The Middle Party (merger between the Christian Democratic People's Party (CVP) and the Civic Democratic Party (BDP))",
                Some("Liberal"),
            ),
            ("Swiss People's Party (SVP)", Some("Conservative")),
            ("Federal Democratic Union (EDU)", Some("Conservative")),
            (
                "Evangelical People's Party of Switzerland (EPP)",
                Some("Conservative"),
            ),
            ("Mouvement Citoyens Genevois (MCG)", Some("Conservative")),
            ("Lega dei Ticinesi (Lega)", Some("Conservative")),
            ("Others, such as", NONE),
            ("I don't feel close to any party", Some("No party association")),
        ],
    )
}

/// Choice-experiment attribute levels in French, German and Italian mapped to English.
pub fn translation_map() -> MappingTable {
    let groups: [(&str, [&str; 3]); 13] = [
        (
            "All people pay the same amount",
            [
                "Tous les citoyens paient le même montant",
                "Alle Menschen zahlen den gleichen Betrag",
                "Tutte le persone pagano lo stesso importo",
            ],
        ),
        (
            "People pay proportionally to their income",
            [
                "Les personnes paient proportionnellement à leurs revenus",
                "Menschen zahlen proportional zu ihrem Einkommen",
                "Le persone pagano in proporzione al loro reddito",
            ],
        ),
        (
            "People & companies being protected by protective measures",
            [
                "Les personnes et entreprises bénéficiant des mesures de protection",
                "Menschen und Unternehmen, die von Schutzmaßnahmen profitieren",
                "Le persone e aziende che beneficiano di misure di protezione",
            ],
        ),
        (
            "People pay proportionally to their CO2 emissions",
            [
                "Les personnes paient proportionnellement à leurs émissions de CO2",
                "Menschen zahlen proportional zu ihrem CO2-Ausstoss",
                "Le persone pagano in proporzione alle loro emissioni di CO2",
            ],
        ),
        (
            "Companies pay proportionally to their CO2 emissions",
            [
                "Les entreprises paient proportionnellement à leurs émissions de CO2",
                "Unternehmen zahlen proportional zu ihrem CO2-Ausstoss",
                "Le aziende pagano in proporzione alle loro emissioni di CO2",
            ],
        ),
        (
            "Low-income earners exempted from costs",
            [
                "Les personnes à faible revenu peuvent être exemptées des coûts",
                "mit Ausnahme von Menschen mit niedrigem Einkommen",
                "Le persone a basso reddito sono esentate dai costi",
            ],
        ),
        (
            "Low- and middle-income earners exempted from costs",
            [
                "Les personnes à faibles et moyens revenus peuvent être exemptées des coûts",
                "mit Ausnahme von Menschen mit niedrigem und mittlerem Einkommen",
                "Le persone a basso e medio reddito sono esentate dai costi",
            ],
        ),
        (
            "No groups exempted from costs",
            [
                "Aucun groupe n'est exempté des coûts",
                "Keine Gruppen sind von den Kosten ausgenommen",
                "Nessun gruppo è esentato dai costi",
            ],
        ),
        (
            "Municipalities most affected by natural hazards even if they are economically declining",
            [
                "Les municipalités les plus touchées par les risques naturels, même si elles sont en déclin économique",
                "Gemeinden, die am stärksten von Naturgefahren betroffen sind, selbst wenn sie wirtschaftlich im Rückgang sind",
                "I comuni più a rischio dai pericoli naturali, anche se sono economicamente in declino",
            ],
        ),
        (
            "Economically prosperous municipalities",
            [
                "Les municipalités économiquement prospères",
                "Wirtschaftlich wohlhabende Gemeinden",
                "I comuni economicamente prosperi",
            ],
        ),
        (
            "Municipalities in which people have lived in for many years should be protected at all costs",
            [
                "Les communes dans lesquelles les gens vivent depuis de nombreuses années doivent être protégées à tout prix",
                "Gemeinden, in denen Menschen seit vielen Jahren leben, sollten um jeden Preis geschützt werden",
                "I comuni in cui le persone vivono da molti anni devono essere protetti ad ogni costo",
            ],
        ),
        (
            "Equal protection levels for all municipalities",
            [
                "Niveaux de protection égaux pour toutes les municipalités",
                "Gleiche Schutzniveaus für alle Gemeinden",
                "Livelli di protezione uguali per tutti i comuni",
            ],
        ),
        (
            "Culturally valuable municipalities e.g. with historic buildings",
            [
                "Municipalités ayant une grande valeur culturelle, par exemple celles dotées de bâtiments historiques",
                "Gemeinden mit vielen Kulturgütern wie z.B. historischen Gebäuden",
                "Comuni di grande valore culturale, ad esempio con edifici storici",
            ],
        ),
    ];
    let mut table = MappingTable::new("translations");
    for (english, localized) in groups {
        for label in localized {
            table.insert(label, MappedValue::text(english));
        }
    }
    table
}

/// Past natural-hazard damage: 1 = none, 0 = any reported damage.
pub fn nh_experience_map() -> MappingTable {
    let mut table = MappingTable::new("nh_experience");
    table.insert("No", MappedValue::Number(1.0));
    for label in [
        "Yes, due to a different natural hazard such as",
        "Yes, due to flooding",
        "Yes, due to a debris flow",
        "Yes, due to a landslide",
        "Yes, due to flooding,Yes, due to a different natural hazard such as",
        "Yes, due to flooding,Yes, due to a landslide,Yes, due to a different natural hazard such as",
        "Yes, due to flooding,Yes, due to a debris flow,Yes, due to a landslide",
        "Yes, due to flooding,Yes, due to a landslide",
        "Yes, due to flooding,Yes, due to a debris flow",
        "Yes, due to flooding,Yes, due to a debris flow,Yes, due to a landslide,Yes, due to a different natural hazard such as",
    ] {
        table.insert(label, MappedValue::Number(0.0));
    }
    table
}

/// Choice-task option labels.
pub fn preference_map() -> MappingTable {
    MappingTable::from_pairs("preference", [("Option 1", 1.0), ("Option 2", 2.0)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_name_resolves() {
        for name in BUILTIN_TABLES {
            let table = builtin_table(name).unwrap();
            assert_eq!(table.name(), *name);
            assert!(!table.is_empty());
        }
    }

    #[test]
    fn unknown_table_is_invalid_argument() {
        assert!(matches!(
            builtin_table("colors"),
            Err(PanelError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn likert_sentinel_is_missing() {
        let table = likert_map();
        assert_eq!(table.get(LIKERT_UNKNOWN_SENTINEL), Some(&MappedValue::Missing));
        assert_eq!(
            table.get("6 - Strongly agree").and_then(MappedValue::as_number),
            Some(6.0)
        );
    }

    #[test]
    fn demographics_has_single_prefer_not_to_say_key() {
        let table = demographics_map();
        assert!(table.shadowed().is_empty());
        assert_eq!(table.get("Prefer not to say "), Some(&MappedValue::Missing));
        assert_eq!(table.get("50 or older"), Some(&MappedValue::text("50+")));
    }

    #[test]
    fn translations_collapse_languages() {
        let table = translation_map();
        let english = MappedValue::text("Economically prosperous municipalities");
        assert_eq!(table.get("Wirtschaftlich wohlhabende Gemeinden"), Some(&english));
        assert_eq!(table.get("I comuni economicamente prosperi"), Some(&english));
        assert_eq!(table.len(), 39);
    }
}
