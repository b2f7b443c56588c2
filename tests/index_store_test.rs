use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use marquee::data::FieldOption;
use marquee::lexical::IndexStore;
use marquee::storage::file::FileStorageConfig;
use marquee::{
    CancellationToken, Document, Engine, EngineConfig, FieldValue, FilmRecord, MarqueeError,
    Schema, SearchRequest, StandardAnalyzer, StorageConfig, StorageFactory,
};

fn file_config(path: &Path) -> EngineConfig {
    EngineConfig::new(StorageConfig::File(FileStorageConfig::new(path)))
}

fn film(id: &str, title: &str) -> FilmRecord {
    FilmRecord {
        id: id.into(),
        title: title.into(),
        ..FilmRecord::default()
    }
}

fn segment_files(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".seg"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_index_survives_reopen() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(file_config(temp_dir.path()))?;
        engine.add_documents(vec![film("1", "Vertigo"), film("2", "Rear Window")])?;
        engine.add_documents(vec![film("3", "Vertigo Revisited")])?;
    }

    let engine = Engine::open(file_config(temp_dir.path()))?;
    let stats = engine.stats();
    assert_eq!(stats.doc_count, 3);
    assert_eq!(stats.segment_count, 2);

    let result = engine.search(&SearchRequest::new("vertigo"))?;
    assert_eq!(result.total_hits, 2);
    assert_eq!(result.hits[0].id, "1");
    assert_eq!(result.hits[1].id, "3");
    Ok(())
}

#[test]
fn test_non_finite_double_fields_reopen() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let open = || {
        let storage = StorageFactory::create(StorageConfig::File(FileStorageConfig::new(
            temp_dir.path(),
        )))?;
        let schema = Schema::builder()
            .add_field("title", FieldOption::INDEXED)
            .add_field("score", FieldOption::STORED)
            .build();
        IndexStore::open(storage, schema, Arc::new(StandardAnalyzer::new()))
    };
    {
        let store = open()?;
        let docs = vec![
            Document::new()
                .with_field("title", "Solaris")
                .with_field("score", f64::NAN),
            Document::new()
                .with_field("title", "Stalker")
                .with_field("score", f64::INFINITY),
        ];
        assert_eq!(store.add_documents(docs)?, 2);
    }

    let store = open()?;
    let snapshot = store.open_read_snapshot();
    assert_eq!(snapshot.doc_count(), 2);
    for ordinal in 0..2 {
        let doc = snapshot.document(ordinal).unwrap();
        assert_eq!(doc.get("score"), Some(&FieldValue::Double(0.0)));
    }
    Ok(())
}

#[test]
fn test_clear_survives_reopen() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(file_config(temp_dir.path()))?;
        engine.add_documents(vec![film("1", "Vertigo")])?;
        engine.clear_index()?;
        assert!(segment_files(temp_dir.path()).is_empty());
    }

    let engine = Engine::open(file_config(temp_dir.path()))?;
    assert_eq!(engine.stats().doc_count, 0);
    assert_eq!(engine.search(&SearchRequest::new("vertigo"))?.total_hits, 0);

    engine.add_documents(vec![film("2", "Vertigo")])?;
    assert_eq!(engine.search(&SearchRequest::new("vertigo"))?.hits[0].id, "2");
    Ok(())
}

#[test]
fn test_corrupt_segment_is_reported() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(file_config(temp_dir.path()))?;
        engine.add_documents(vec![film("1", "Vertigo")])?;
    }

    let segments = segment_files(temp_dir.path());
    assert_eq!(segments.len(), 1);
    let path = temp_dir.path().join(&segments[0]);
    let mut bytes = fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    let err = Engine::open(file_config(temp_dir.path())).unwrap_err();
    assert!(err.is_storage(), "unexpected error: {err}");
    Ok(())
}

#[test]
fn test_failed_commit_leaves_index_unchanged() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(file_config(temp_dir.path()))?;
    engine.add_documents(vec![film("1", "Vertigo")])?;
    let before = engine.stats();
    let segments_before = segment_files(temp_dir.path());

    // A directory in the way of the temporary manifest makes the publish step fail
    // after the segment itself has been written.
    fs::create_dir(temp_dir.path().join("segments.json.tmp")).unwrap();
    let err = engine
        .add_documents(vec![film("2", "Vertigo Again")])
        .unwrap_err();
    assert!(err.is_storage(), "unexpected error: {err}");

    assert_eq!(engine.stats(), before);
    assert_eq!(segment_files(temp_dir.path()), segments_before);
    assert_eq!(engine.search(&SearchRequest::new("vertigo"))?.total_hits, 1);

    fs::remove_dir(temp_dir.path().join("segments.json.tmp")).unwrap();
    engine.add_documents(vec![film("2", "Vertigo Again")])?;
    assert_eq!(engine.search(&SearchRequest::new("vertigo"))?.total_hits, 2);

    drop(engine);
    let reopened = Engine::open(file_config(temp_dir.path()))?;
    assert_eq!(reopened.stats().doc_count, 2);
    Ok(())
}

#[test]
fn test_snapshot_isolation() -> marquee::Result<()> {
    let engine = Engine::open(EngineConfig::default())?;
    engine.add_documents(vec![film("1", "Psycho")])?;

    let ranked = engine.rank(&SearchRequest::new("psycho"))?;
    let snapshot = engine.snapshot();

    engine.add_documents(vec![film("2", "Psycho II")])?;
    engine.clear_index()?;

    assert_eq!(snapshot.doc_count(), 1);
    assert_eq!(ranked.total_hits(), 1);
    let page = ranked.page(0, 10);
    assert_eq!(page.hits.len(), 1);
    assert_eq!(page.hits[0].title, "Psycho");

    assert_eq!(engine.search(&SearchRequest::new("psycho"))?.total_hits, 0);
    Ok(())
}

#[test]
fn test_readers_see_whole_batches() -> marquee::Result<()> {
    const BATCH: usize = 5;
    const BATCHES: usize = 20;

    let engine = Arc::new(Engine::open(EngineConfig::default())?);
    std::thread::scope(|scope| {
        let writer = Arc::clone(&engine);
        scope.spawn(move || {
            for b in 0..BATCHES {
                let films = (0..BATCH)
                    .map(|i| film(&format!("{b}-{i}"), "Rope"))
                    .collect();
                writer.add_documents(films).unwrap();
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&engine);
            scope.spawn(move || {
                let mut last = 0;
                for _ in 0..200 {
                    let result = reader.search(&SearchRequest::new("rope")).unwrap();
                    let total = result.total_hits as usize;
                    assert_eq!(total % BATCH, 0, "saw a partial batch");
                    assert!(total >= last, "index went backwards");
                    last = total;
                }
            });
        }
    });

    assert_eq!(engine.stats().doc_count as usize, BATCH * BATCHES);
    Ok(())
}

#[test]
fn test_cancelled_operations() -> marquee::Result<()> {
    let engine = Engine::open(EngineConfig::default())?;
    engine.add_documents(vec![film("1", "Notorious")])?;

    let token = CancellationToken::new();
    token.cancel();

    let err = engine
        .add_documents_with_cancel(vec![film("2", "Notorious")], &token)
        .unwrap_err();
    assert!(matches!(err, MarqueeError::Cancelled));
    assert_eq!(engine.stats().doc_count, 1);

    let err = engine
        .search_with_cancel(&SearchRequest::new("notorious"), &token)
        .unwrap_err();
    assert!(matches!(err, MarqueeError::Cancelled));

    let live = CancellationToken::new();
    assert_eq!(
        engine
            .search_with_cancel(&SearchRequest::new("notorious"), &live)?
            .total_hits,
        1
    );
    Ok(())
}

#[test]
fn test_populate_from_csv() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("films.csv");
    let mut file = fs::File::create(&csv_path).unwrap();
    writeln!(
        file,
        "id,title,overview,tagline,runtime,revenue,vote_average,release_date"
    )
    .unwrap();
    writeln!(
        file,
        "438631,Dune,\"Paul Atreides, a brilliant young man\",Beyond fear destiny awaits,155,402027830,8.0,2021-09-15"
    )
    .unwrap();
    writeln!(
        file,
        "693134,Dune Part Two,Follow the mythic journey,Long live the fighters,166,711844358,8.5,2024-02-27"
    )
    .unwrap();
    writeln!(file, "1,Broken Row,,,abc,,n/a,someday").unwrap();
    drop(file);

    let engine = Engine::open(file_config(&temp_dir.path().join("index")))?;
    assert_eq!(engine.populate_from_csv(&csv_path)?, 3);

    let result = engine.search(
        &SearchRequest::builder("dune")
            .runtime(Some(160), Some(200))
            .build(),
    )?;
    assert_eq!(result.total_hits, 1);
    assert_eq!(result.hits[0].id, "693134");
    assert_eq!(result.hits[0].revenue, 711_844_358);

    let result = engine.search(&SearchRequest::new("brilliant young man"))?;
    assert_eq!(result.hits[0].id, "438631");

    let broken = engine.search(&SearchRequest::new("broken row"))?;
    assert_eq!(broken.hits[0].runtime, 0);
    assert_eq!(broken.hits[0].release_date, None);
    Ok(())
}

#[test]
fn test_populate_from_missing_csv() -> marquee::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(EngineConfig::default())?;
    let err = engine
        .populate_from_csv(temp_dir.path().join("missing.csv"))
        .unwrap_err();
    assert!(matches!(err, MarqueeError::Ingest(_)));
    assert_eq!(engine.stats().doc_count, 0);
    Ok(())
}
