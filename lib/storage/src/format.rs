// Line format for persisted matchings and ground truth:
//
//   db %%% table %%% attr ==>> ontology %%% class
//
// Fields are trimmed after splitting. Trailing class-side fields (such as a
// list of matchers) are ignored; blank lines are skipped.
use atomicwrites::{AtomicFile, OverwriteBehavior};
use semprop_core::{Error, Matching, OntologyClass, Result, SchemaElement};
use std::io::Write;
use std::path::Path;

pub const CLASS_SEPARATOR: &str = "==>>";
pub const FIELD_SEPARATOR: &str = "%%%";

/// Parse a single matching line
pub fn parse_matching(line: &str) -> std::result::Result<Matching, String> {
    let mut sides = line.split(CLASS_SEPARATOR);
    let (schema, class) = match (sides.next(), sides.next(), sides.next()) {
        (Some(schema), Some(class), None) => (schema, class),
        _ => return Err(format!("expected exactly one '{}' separator", CLASS_SEPARATOR)),
    };

    let schema: Vec<&str> = schema.split(FIELD_SEPARATOR).map(str::trim).collect();
    if schema.len() != 3 {
        return Err(format!(
            "expected 3 schema fields (db, table, attribute), got {}",
            schema.len()
        ));
    }

    let class: Vec<&str> = class.split(FIELD_SEPARATOR).map(str::trim).collect();
    if class.len() < 2 {
        return Err(format!(
            "expected at least 2 class fields (ontology, class), got {}",
            class.len()
        ));
    }

    if schema.iter().chain(&class[..2]).any(|f| f.is_empty()) {
        return Err("empty field".to_string());
    }

    Ok(Matching::new(
        SchemaElement::new(schema[0], schema[1], schema[2]),
        OntologyClass::new(class[0], class[1]),
    ))
}

/// Check that every field of `matching` survives a write and re-read
pub fn check_writable(matching: &Matching) -> std::result::Result<(), String> {
    let e = &matching.element;
    let c = &matching.class;
    let fields = [
        ("database", &e.database),
        ("table", &e.table),
        ("attribute", &e.attribute),
        ("ontology", &c.ontology),
        ("class", &c.class_name),
    ];
    for (name, value) in fields {
        if value.is_empty() {
            return Err(format!("empty {} field", name));
        }
        if value.trim() != value.as_str() {
            return Err(format!("{} field {:?} has surrounding whitespace", name, value));
        }
        if value.contains(FIELD_SEPARATOR) || value.contains(CLASS_SEPARATOR) {
            return Err(format!("{} field {:?} contains a separator", name, value));
        }
    }
    Ok(())
}

/// Render a matching in the persisted line format
pub fn format_matching(matching: &Matching) -> String {
    let e = &matching.element;
    let c = &matching.class;
    format!(
        "{db} {sep} {table} {sep} {attr} {arrow} {onto} {sep} {class}",
        db = e.database,
        table = e.table,
        attr = e.attribute,
        onto = c.ontology,
        class = c.class_name,
        sep = FIELD_SEPARATOR,
        arrow = CLASS_SEPARATOR,
    )
}

/// Parse a whole document; any malformed line fails the document
pub fn parse_matchings(source_name: &str, content: &str) -> Result<Vec<Matching>> {
    let mut matchings = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let matching = parse_matching(line).map_err(|reason| Error::DataFormat {
            source_name: source_name.to_string(),
            line: i + 1,
            reason,
        })?;
        matchings.push(matching);
    }
    Ok(matchings)
}

pub fn read_matchings<P: AsRef<Path>>(path: P) -> Result<Vec<Matching>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    parse_matchings(&path.display().to_string(), &content)
}

/// Write matchings, one per line, replacing the file atomically.
///
/// Nothing is written when a matching would not read back unchanged.
pub fn write_matchings<P: AsRef<Path>>(path: P, matchings: &[Matching]) -> Result<()> {
    let path = path.as_ref();
    let mut content = String::new();
    for (i, matching) in matchings.iter().enumerate() {
        check_writable(matching).map_err(|reason| Error::DataFormat {
            source_name: path.display().to_string(),
            line: i + 1,
            reason,
        })?;
        content.push_str(&format_matching(matching));
        content.push('\n');
    }
    write_atomic(path, content.as_bytes())
}

pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(data))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_fields() {
        let line = "chembl %%% activity_stds %%%  std_act_id ==>> efo %%% Metabolomic Profiling ";
        let m = parse_matching(line).unwrap();
        assert_eq!(
            m.element,
            SchemaElement::new("chembl", "activity_stds", "std_act_id")
        );
        assert_eq!(m.class, OntologyClass::new("efo", "Metabolomic Profiling"));
    }

    #[test]
    fn test_parse_ignores_trailing_class_fields() {
        let m = parse_matching("db %%% t %%% _ ==>> efo %%% Assay %%% l4,l42").unwrap();
        assert_eq!(m.class.class_name, "Assay");
        assert!(m.element.is_table_level());
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_matching("db %%% t %%% a efo %%% Assay").is_err());
        assert!(parse_matching("db %%% t ==>> efo %%% Assay").is_err());
        assert!(parse_matching("db %%% t %%% a ==>> efo").is_err());
        assert!(parse_matching("db %%% t %%% a ==>> efo %%% C ==>> x").is_err());
        assert!(parse_matching("db %%%  %%% a ==>> efo %%% C").is_err());
    }

    #[test]
    fn test_document_error_reports_line() {
        let doc = "db %%% t %%% a ==>> efo %%% A\n\nbroken line\n";
        match parse_matchings("gold", doc) {
            Err(Error::DataFormat { source_name, line, .. }) => {
                assert_eq!(source_name, "gold");
                assert_eq!(line, 3);
            }
            other => panic!("expected a data format error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l4");
        let matchings = vec![
            Matching::new(
                SchemaElement::table("chembl", "assays"),
                OntologyClass::new("efo", "Assay"),
            ),
            Matching::new(
                SchemaElement::new("chembl", "docs", "journal"),
                OntologyClass::new("efo", "Publication"),
            ),
        ];

        write_matchings(&path, &matchings).unwrap();
        assert_eq!(read_matchings(&path).unwrap(), matchings);
    }

    #[test]
    fn test_write_rejects_fields_that_would_not_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l4");
        let table = SchemaElement::table("chembl", "cell_dictionary");
        let unwritable = [
            OntologyClass::new("efo", "Cell %%% Line"),
            OntologyClass::new("efo", "Cell ==>> Line"),
            OntologyClass::new("efo", " Cell Line"),
            OntologyClass::new("", "Cell Line"),
        ];

        for class in unwritable {
            let matching = Matching::new(table.clone(), class);
            assert!(check_writable(&matching).is_err());
            assert!(matches!(
                write_matchings(&path, &[matching]),
                Err(Error::DataFormat { line: 1, .. })
            ));
            assert!(!path.exists());
        }
    }
}
