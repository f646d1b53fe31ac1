//! Document builder: renders the harvester XML and its checksum.
//!
//! Rendering is a pure function of the config, the entry set and the run
//! date, so re-running with the same inputs yields byte-identical output.
mod xml;

use crate::config::{Bilingual, CapabilityFlags, FeedConfig};
use crate::store::{Entry, EntrySet};
use crate::templates::{fill, TemplateVars};
use chrono::{Datelike, NaiveDate};
use md5::{Digest, Md5};
use xml::XmlWriter;

/// Harvester schema namespace bound to the root element.
pub const HARVESTER_NAMESPACE: &str = "urn:otwarte-dane:harvester:1.13";
pub const HARVESTER_PREFIX_ATTR: &str = "xmlns:ns2";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const STATUS_PUBLISHED: (&str, &str) = ("status", "published");

/// Render the full document as UTF-8 bytes.
pub fn render(config: &FeedConfig, entries: &EntrySet, today: NaiveDate) -> Vec<u8> {
    let mut w = XmlWriter::new();
    w.open(
        "ns2:datasets",
        &[
            (HARVESTER_PREFIX_ATTR, HARVESTER_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
        ],
    );
    w.open("dataset", &[STATUS_PUBLISHED]);
    append_dataset_fields(&mut w, config, today);
    w.open("resources", &[]);
    for entry in entries {
        append_resource(&mut w, config, entry, today);
    }
    w.finish().into_bytes()
}

/// Lowercase hex MD5 of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn append_dataset_fields(w: &mut XmlWriter, config: &FeedConfig, today: NaiveDate) {
    let vars = TemplateVars {
        owner: &config.owner_name,
        date: "",
        year: today.year(),
    };
    let dataset = &config.dataset;
    w.leaf("extIdent", &config.owner_id);
    append_bilingual(w, "title", &config.texts.dataset_title, &vars);
    append_bilingual(w, "description", &config.texts.dataset_description, &vars);
    w.leaf("updateFrequency", &dataset.update_frequency);
    append_flags(w, &dataset.flags);
    w.open("categories", &[]);
    w.leaf("category", &dataset.category);
    w.close();
    if !dataset.tags.is_empty() {
        w.open("tags", &[]);
        for tag in &dataset.tags {
            w.text_element("tag", &[("lang", tag.lang.as_str())], &tag.text);
        }
        w.close();
    }
}

fn append_resource(w: &mut XmlWriter, config: &FeedConfig, entry: &Entry, today: NaiveDate) {
    let date = entry.date.to_string();
    let vars = TemplateVars {
        owner: &config.owner_name,
        date: &date,
        year: entry.date.known().unwrap_or(today).year(),
    };
    let resource = &config.resource;
    w.open("resource", &[STATUS_PUBLISHED]);
    w.leaf("extIdent", &entry.identifier);
    w.leaf("url", &entry.url);
    append_bilingual(w, "title", &config.texts.resource_title, &vars);
    append_bilingual(w, "description", &config.texts.resource_description, &vars);
    w.leaf("availability", &resource.availability);
    w.leaf("dataDate", &date);
    if !resource.special_signs.is_empty() {
        w.open("specialSigns", &[]);
        for sign in &resource.special_signs {
            w.leaf("specialSign", sign);
        }
        w.close();
    }
    append_flags(w, &resource.flags);
    w.flag("containsProtectedData", resource.contains_protected_data);
    w.close();
}

fn append_bilingual(
    w: &mut XmlWriter,
    name: &'static str,
    text: &Bilingual,
    vars: &TemplateVars<'_>,
) {
    w.open(name, &[]);
    w.leaf("polish", &fill(&text.polish, vars));
    w.leaf("english", &fill(&text.english, vars));
    w.close();
}

fn append_flags(w: &mut XmlWriter, flags: &CapabilityFlags) {
    w.flag("hasDynamicData", flags.has_dynamic_data);
    w.flag("hasHighValueData", flags.has_high_value_data);
    w.flag(
        "hasHighValueDataFromEuropeanCommissionList",
        flags.has_high_value_data_from_ec_list,
    );
    w.flag("hasResearchData", flags.has_research_data);
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
