//! The French code table.

use super::registry::CodeRegistry;
use super::types::Code;

/// `(short_name, long_name, alias_pattern)` for every supported code.
///
/// Long names are spelled exactly as the Legifrance `NOM_CODE` facet
/// expects them. Apostrophes accept both the ASCII and typographic forms.
const FRENCH_CODES: &[(&str, &str, &str)] = &[
    (
        "CCIV",
        "Code civil",
        r"Code\scivil|C\.\sciv\.|Code\sciv\.|C\.civ\.|civ\.|CCIV",
    ),
    (
        "CPRCIV",
        "Code de procédure civile",
        r"Code\sde\sprocédure\scivile|C\.\spr\.\sciv\.|CPC",
    ),
    ("CCOM", "Code de commerce", r"Code\sde\scommerce|C\.\scom\."),
    ("CTRAV", "Code du travail", r"Code\sdu\stravail|C\.\strav\."),
    (
        "CPI",
        "Code de la propriété intellectuelle",
        r"Code\sde\sla\spropriété\sintellectuelle|CPI|C\.\spr\.\sint\.",
    ),
    ("CPEN", "Code pénal", r"Code\spénal|C\.\spén\."),
    (
        "CPP",
        "Code de procédure pénale",
        r"Code\sde\sprocédure\spénale|CPP",
    ),
    (
        "CASSUR",
        "Code des assurances",
        r"Code\sdes\sassurances|C\.\sassur\.",
    ),
    (
        "CCONSO",
        "Code de la consommation",
        r"Code\sde\sla\sconsommation|C\.\sconso\.",
    ),
    (
        "CSI",
        "Code de la sécurité intérieure",
        r"Code\sde\sla\ssécurité\sintérieure|CSI",
    ),
    (
        "CSP",
        "Code de la santé publique",
        r"Code\sde\sla\ssanté\spublique|C\.\ssant\.\spub\.|CSP",
    ),
    (
        "CSS",
        "Code de la sécurité sociale",
        r"Code\sde\sla\ssécurité\ssociale|C\.\ssec\.\ssoc\.|CSS",
    ),
    (
        "CESEDA",
        "Code de l'entrée et du séjour des étrangers et du droit d'asile",
        r"Code\sde\sl['’]entrée\set\sdu\sséjour\sdes\sétrangers\set\sdu\sdroit\sd['’]asile|CESEDA",
    ),
    (
        "CGCT",
        "Code général des collectivités territoriales",
        r"Code\sgénéral\sdes\scollectivités\sterritoriales|CGCT",
    ),
    (
        "CPCE",
        "Code des postes et des communications électroniques",
        r"Code\sdes\spostes\set\sdes\scommunications\sélectroniques|CPCE",
    ),
    (
        "CENV",
        "Code de l'environnement",
        r"Code\sde\sl['’]environnement|C\.\senvir\.|CE\.",
    ),
    (
        "CJA",
        "Code de justice administrative",
        r"Code\sde\sjustice\sadministrative|CJA",
    ),
];

/// Every supported code as a fresh `Code` value, in table order.
#[must_use]
pub fn french_codes() -> Vec<Code> {
    FRENCH_CODES
        .iter()
        .map(|(short, long, alias)| Code::new(*short, *long, *alias))
        .collect()
}

/// Create the registry of supported French codes.
///
/// Built once at start-up and shared by reference afterwards; nothing
/// mutates it once this function returns.
#[must_use]
pub fn create_french_code_registry() -> CodeRegistry {
    let mut registry = CodeRegistry::new();
    for code in french_codes() {
        registry.register(code);
    }
    registry
}
