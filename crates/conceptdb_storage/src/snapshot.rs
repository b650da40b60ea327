//! The version-stamped snapshot stream.
//!
//! A snapshot is four blocks behind a presence marker and a version
//! stamp: the header (identity name and max id), the unique indices, the
//! per-concept key arrays, and the per-concept value arrays. Attributes
//! inside the unique-indices block are referenced by name, not id, so the
//! block survives id renumbering; the reader resolves names against the
//! rebuilt concept table. Compression wrapping, when wanted, goes around
//! the `Read`/`Write` handed in here.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use conceptdb_codec::{Value, ValueReader, ValueWriter, FORMAT_VERSION};
use conceptdb_core::concept::NAME;
use conceptdb_core::{Concept, Config, ConceptReader, DenseDb, Id, NameResolver};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Writes `db` as a snapshot stream to `out`.
pub fn write_snapshot<W: Write>(db: &DenseDb, out: W) -> StorageResult<()> {
    let mut writer = ValueWriter::new(out);
    writer.write_i32(1)?;
    writer.write_i32(FORMAT_VERSION)?;
    writer.write_utf(db.identity())?;
    writer.write_i32(db.max_id().unwrap_or(-1))?;
    write_unique_indices(db, &mut writer)?;
    write_key_block(db, &mut writer)?;
    write_value_block(db, &mut writer)?;
    writer.flush()?;
    debug!(
        identity = db.identity(),
        concepts = db.concept_count(),
        "snapshot written"
    );
    Ok(())
}

/// Reads a snapshot stream back into a dense store.
pub fn read_snapshot<R: Read>(input: R) -> StorageResult<DenseDb> {
    let mut reader = ValueReader::new(input);
    if reader.read_i32()? != 1 {
        return Err(StorageError::MissingDatabase);
    }
    let version = reader.read_i32()?;
    if version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    let identity = reader.read_utf()?;
    let max_id = reader.read_i32()?;
    if max_id < -1 {
        return Err(StorageError::corrupt(format!("max id {max_id}")));
    }
    let count = (i64::from(max_id) + 1) as usize;

    let named_indices = read_unique_indices(&mut reader)?;
    let keys = read_key_block(&mut reader, count)?;
    let values = read_value_block(&mut reader, count)?;

    let concepts: Vec<Concept> = keys
        .into_iter()
        .zip(values)
        .map(|(keys, values)| Concept { keys, values })
        .collect();

    let unique = resolve_indices(&concepts, named_indices)?;
    let db = DenseDb::from_parts(identity, concepts, unique, Config::new())?;
    info!(
        identity = db.identity(),
        concepts = db.concept_count(),
        "snapshot loaded"
    );
    Ok(db)
}

/// Writes a snapshot to `path`, replacing any existing file.
pub fn save_to_path(db: &DenseDb, path: impl AsRef<Path>) -> StorageResult<()> {
    let file = File::create(path.as_ref())?;
    write_snapshot(db, BufWriter::new(file))?;
    info!(path = %path.as_ref().display(), "snapshot saved");
    Ok(())
}

/// Loads a snapshot from `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> StorageResult<DenseDb> {
    let file = File::open(path.as_ref())?;
    read_snapshot(BufReader::new(file))
}

fn write_unique_indices<W: Write>(db: &DenseDb, writer: &mut ValueWriter<W>) -> StorageResult<()> {
    let attributes = db.unique_attribute_ids();
    writer.write_i32(1)?;
    writer.write_i32(attributes.len() as i32)?;
    for key in attributes {
        let name = db
            .resolve_id(key)
            .ok_or_else(|| StorageError::UnknownAttribute {
                name: format!("id {key}"),
            })?;
        writer.write_utf(name)?;
        let entries = db.unique_index(key).map(HashMap::len).unwrap_or_default();
        writer.write_i32(entries as i32)?;
        if let Some(index) = db.unique_index(key) {
            for (value, &id) in index {
                writer.write_value(value)?;
                writer.write_i32(id)?;
            }
        }
    }
    Ok(())
}

fn read_unique_indices<R: Read>(
    reader: &mut ValueReader<R>,
) -> StorageResult<Vec<(String, Vec<(Value, Id)>)>> {
    if reader.read_i32()? != 1 {
        return Ok(Vec::new());
    }
    let attribute_count = block_len(reader.read_i32()?, "unique attribute count")?;
    let mut indices = Vec::with_capacity(attribute_count);
    for _ in 0..attribute_count {
        let name = reader.read_utf()?;
        let entry_count = block_len(reader.read_i32()?, "unique entry count")?;
        let mut entries = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            let value = reader.read_value()?;
            let id = reader.read_i32()?;
            entries.push((value, id));
        }
        indices.push((name, entries));
    }
    Ok(indices)
}

/// Maps index attribute names back to ids using the name attribute of
/// each rebuilt concept.
fn resolve_indices(
    concepts: &[Concept],
    named: Vec<(String, Vec<(Value, Id)>)>,
) -> StorageResult<HashMap<Id, HashMap<Value, Id>>> {
    let mut by_name: HashMap<&str, Id> = HashMap::new();
    for concept in concepts {
        if let Some(name) = concept.value(NAME).and_then(Value::as_name) {
            by_name.insert(name, concept.id());
        }
    }
    let mut unique = HashMap::with_capacity(named.len());
    for (name, entries) in named {
        let &key = by_name
            .get(name.as_str())
            .ok_or(StorageError::UnknownAttribute { name })?;
        unique.insert(key, entries.into_iter().collect());
    }
    Ok(unique)
}

fn write_key_block<W: Write>(db: &DenseDb, writer: &mut ValueWriter<W>) -> StorageResult<()> {
    writer.write_i32(1)?;
    writer.write_i32(db.concept_count() as i32)?;
    for id in 0..db.concept_count() {
        match db.keys(id as Id) {
            Some(keys) => {
                writer.write_i32(1)?;
                writer.write_i32(keys.len() as i32)?;
                for &key in keys {
                    writer.write_i32(key)?;
                }
            }
            None => writer.write_i32(0)?,
        }
    }
    Ok(())
}

fn read_key_block<R: Read>(reader: &mut ValueReader<R>, count: usize) -> StorageResult<Vec<Vec<Id>>> {
    if reader.read_i32()? != 1 {
        return Err(StorageError::corrupt("missing key index block"));
    }
    let found = block_len(reader.read_i32()?, "key index length")?;
    if found != count {
        return Err(StorageError::corrupt(format!(
            "key index holds {found} concepts, header says {count}"
        )));
    }
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        if reader.read_i32()? != 1 {
            rows.push(Vec::new());
            continue;
        }
        let len = block_len(reader.read_i32()?, "key array length")?;
        let mut keys = Vec::with_capacity(len);
        for _ in 0..len {
            keys.push(reader.read_i32()?);
        }
        rows.push(keys);
    }
    Ok(rows)
}

fn write_value_block<W: Write>(db: &DenseDb, writer: &mut ValueWriter<W>) -> StorageResult<()> {
    writer.write_i32(1)?;
    writer.write_i32(db.concept_count() as i32)?;
    for id in 0..db.concept_count() {
        match db.values(id as Id) {
            Some(values) => {
                writer.write_i32(1)?;
                writer.write_i32(values.len() as i32)?;
                for value in values {
                    writer.write_value(value)?;
                }
            }
            None => writer.write_i32(0)?,
        }
    }
    Ok(())
}

fn read_value_block<R: Read>(
    reader: &mut ValueReader<R>,
    count: usize,
) -> StorageResult<Vec<Vec<Value>>> {
    if reader.read_i32()? != 1 {
        return Err(StorageError::corrupt("missing value index block"));
    }
    let found = block_len(reader.read_i32()?, "value index length")?;
    if found != count {
        return Err(StorageError::corrupt(format!(
            "value index holds {found} concepts, header says {count}"
        )));
    }
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        if reader.read_i32()? != 1 {
            rows.push(Vec::new());
            continue;
        }
        let len = block_len(reader.read_i32()?, "value array length")?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(reader.read_value()?);
        }
        rows.push(values);
    }
    Ok(rows)
}

fn block_len(len: i32, what: &str) -> StorageResult<usize> {
    usize::try_from(len).map_err(|_| StorageError::corrupt(format!("negative {what}: {len}")))
}
