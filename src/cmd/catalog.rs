use anyhow::{Context, Result};

use owlstream::{Catalog, CatalogSection, Config, SiteClient};

pub async fn cmd_catalog(config: &Config, section: &str, skip: usize) -> Result<()> {
    let section = CatalogSection::from_catalog_id(section).with_context(|| {
        let known: Vec<_> = CatalogSection::ALL.iter().map(|s| s.key()).collect();
        format!("Unknown catalog section: {section} (expected one of {})", known.join(", "))
    })?;

    let catalog = Catalog::new(SiteClient::new(config)?, config);
    let entries = catalog.list_entries(section, skip).await;

    for entry in &entries {
        println!("{}\t{}", entry.id, entry.title);
    }
    println!("\n({} entries, {section})", entries.len());
    Ok(())
}
