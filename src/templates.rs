//! Default presentation text for the dataset and its daily resources.
//!
//! Placeholders: `{owner}` (owner display name), `{date}` (resource date as
//! written in history), `{year}` (year of the run date).
pub const DATASET_TITLE_PL: &str = "Ceny ofertowe mieszkań dewelopera {owner} w {year} r.";
pub const DATASET_TITLE_EN: &str = "Offer prices of apartments of developer {owner} in {year}.";
pub const DATASET_DESCRIPTION_PL: &str = "Zbiór danych zawiera informacje o cenach ofertowych mieszkań dewelopera udostępniane zgodnie z art. 19b. ust. 1 Ustawy z dnia 20 maja 2021 r. o ochronie praw nabywcy lokalu mieszkalnego lub domu jednorodzinnego oraz Deweloperskim Funduszu Gwarancyjnym (Dz. U. z 2024 r. poz. 695).";
pub const DATASET_DESCRIPTION_EN: &str = "The dataset contains information on the offer prices of the developer's apartments, published in accordance with Art. 19b(1) of the Act of 20 May 2021 on the protection of the rights of the purchaser of a dwelling or a single-family house and the Developer Guarantee Fund (Journal of Laws of 2024, item 695).";
pub const RESOURCE_TITLE_PL: &str = "Ceny ofertowe mieszkań dewelopera {owner} {date}";
pub const RESOURCE_TITLE_EN: &str = "Offer prices for developer's apartments {owner} {date}";
pub const RESOURCE_DESCRIPTION_PL: &str = "Dane dotyczące cen ofertowych mieszkań dewelopera {owner} udostępnione {date} zgodnie z art. 19b. ust. 1 Ustawy z dnia 20 maja 2021 r. o ochronie praw nabywcy lokalu mieszkalnego lub domu jednorodzinnego oraz Deweloperskim Funduszu Gwarancyjnym (Dz. U. z 2024 r. poz. 695).";
pub const RESOURCE_DESCRIPTION_EN: &str = "Data on offer prices of apartments of developer {owner} published on {date} in accordance with Art. 19b(1) of the Act of 20 May 2021 on the protection of the rights of the purchaser of a dwelling or a single-family house and the Developer Guarantee Fund (Journal of Laws of 2024, item 695).";

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub owner: &'a str,
    pub date: &'a str,
    pub year: i32,
}

/// Substitute placeholders in a single pass so substituted values are never
/// re-expanded.
pub fn fill(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len() + vars.owner.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find('}') else {
            out.push_str(after);
            return out;
        };
        match &after[1..end] {
            "owner" => out.push_str(vars.owner),
            "date" => out.push_str(vars.date),
            "year" => out.push_str(&vars.year.to_string()),
            _ => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
