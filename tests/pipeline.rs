use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use keyword_network::ingest::{
    self, read_edge_list, read_token_lists, read_token_table, write_edge_list, write_token_lists,
};
use keyword_network::{
    build_graph, CooccurrenceTable, Document, NetworkConfig, NetworkError, NoopObserver, Pipeline,
    RunSpec, StageTimingObserver,
};
use keyword_network::pipeline::validation::ValidationEngine;

fn seoul_docs() -> Vec<Document> {
    vec![
        Document::from_text("서울 맛집 추천 서울 여행"),
        Document::from_text("서울 날씨 오늘"),
    ]
}

#[test]
fn seoul_scenario_counts_each_pair_once_per_document() {
    let pipeline = Pipeline::new(NetworkConfig::default()).unwrap();
    let ctx = pipeline
        .run(&seoul_docs(), &mut NoopObserver)
        .into_context()
        .unwrap();

    assert_eq!(
        ctx.token_lists(),
        &[
            vec!["서울", "맛집", "추천", "서울", "여행"],
            vec!["서울", "날씨", "오늘"],
        ]
    );

    assert_eq!(ctx.frequencies().count("서울"), 3);
    assert_eq!(ctx.pairs().get("날씨", "서울"), 1);
    assert_eq!(ctx.pairs().get("맛집", "서울"), 1);
    assert_eq!(ctx.pairs().get("맛집", "추천"), 1);
    // C(4,2) + C(3,2) distinct pairs, no pair shared between the documents
    assert_eq!(ctx.pairs().len(), 9);
}

#[test]
fn threshold_scenario_keeps_only_heavy_pair() {
    let mut pairs = CooccurrenceTable::new();
    pairs.insert("a", "b", 5);
    pairs.insert("b", "c", 3);

    let graph = build_graph(&pairs, 5);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge_weight("a", "b"), Some(5));
    assert_eq!(graph.degree(graph.node_id("a").unwrap()), 1);
    assert_eq!(graph.degree(graph.node_id("b").unwrap()), 1);
    assert!(graph.node_id("c").is_none());
    assert_eq!(graph.max_weight(), 5);
}

#[test]
fn tokens_respect_length_and_stopwords() {
    let config = NetworkConfig::default().with_stopwords(["여행"]);
    let pipeline = Pipeline::new(config).unwrap();
    let docs = vec![
        Document::new("서울 여행 후기", "<b>정말</b> 맛있어요 이 집 최고"),
        Document::new("ㅋㅋ 부산", "contact@blog.kr 바다 구경"),
    ];

    let outcome = pipeline.run(&docs, &mut NoopObserver);
    let stopwords = pipeline.tokenizer().stopwords();

    for tokens in outcome.batch_report().token_lists() {
        for token in tokens {
            assert!(token.chars().count() > 1, "short token {token}");
            assert!(!stopwords.is_stopword(&token), "stopword {token}");
        }
    }
}

#[test]
fn one_bad_document_does_not_blank_the_run() {
    let docs = ingest::parse_documents(
        r#"[
            {"title": "서울 맛집", "description": "서울 맛집 추천"},
            {"title": null, "description": 42},
            {"title": "부산 여행"}
        ]"#,
    )
    .unwrap();
    let mut obs = StageTimingObserver::new();

    let outcome = Pipeline::new(NetworkConfig::default())
        .unwrap()
        .run(&docs, &mut obs);

    let report = outcome.batch_report();
    assert_eq!(report.len(), 3);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped().next().map(|(i, _)| i), Some(1));
    assert!(outcome.is_completed());
    assert_eq!(obs.reports().len(), 4);
}

#[test]
fn record_without_named_fields_fails_fast() {
    let err = ingest::parse_documents(r#"{"0": "서울 맛집", "1": "추천"}"#).unwrap_err();
    assert!(matches!(err, NetworkError::MissingField { .. }));
}

#[test]
fn pipeline_is_idempotent() {
    let pipeline = Pipeline::new(NetworkConfig::default()).unwrap();
    let a = pipeline.run(&seoul_docs(), &mut NoopObserver).into_context().unwrap();
    let b = pipeline.run(&seoul_docs(), &mut NoopObserver).into_context().unwrap();

    assert_eq!(a.frequencies(), b.frequencies());
    assert_eq!(a.pairs(), b.pairs());
    assert_eq!(a.graph(), b.graph());
}

#[test]
fn empty_vocabulary_is_an_outcome() {
    let docs = vec![Document::from_text("!!! ㅠㅠ"), Document::from_text("<br>")];
    let outcome = Pipeline::new(NetworkConfig::default())
        .unwrap()
        .run(&docs, &mut NoopObserver);

    assert!(outcome.is_empty_vocabulary());
    assert!(outcome.context().is_none());
    assert_eq!(outcome.batch_report().len(), 2);
}

#[test]
fn negative_threshold_is_rejected_before_running() {
    let err = Pipeline::new(NetworkConfig::default().with_min_weight(-3)).unwrap_err();
    assert!(matches!(err, NetworkError::InvalidConfig(_)));

    let spec = RunSpec::from_json(r#"{ "v": 1, "graph": { "min_weight": -3 } }"#).unwrap();
    assert!(ValidationEngine::with_defaults().resolve(&spec).is_err());
}

#[test]
fn persisted_tables_round_trip_without_retokenizing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(NetworkConfig::default()).unwrap();
    let ctx = pipeline
        .run(&seoul_docs(), &mut NoopObserver)
        .into_context()
        .unwrap();

    let tokens_path = dir.path().join("tokens.jsonl");
    let mut out = BufWriter::new(File::create(&tokens_path).unwrap());
    write_token_lists(&mut out, ctx.token_lists()).unwrap();
    out.flush().unwrap();
    drop(out);

    let edges_path = dir.path().join("network_edge_list.csv");
    let mut out = BufWriter::new(File::create(&edges_path).unwrap());
    write_edge_list(&mut out, ctx.pairs()).unwrap();
    out.flush().unwrap();
    drop(out);

    let lists = read_token_lists(BufReader::new(File::open(&tokens_path).unwrap())).unwrap();
    assert_eq!(lists, ctx.token_lists());

    let reloaded = pipeline
        .run_token_lists(lists, &mut NoopObserver)
        .into_context()
        .unwrap();
    assert_eq!(reloaded.graph(), ctx.graph());

    let pairs = read_edge_list(BufReader::new(File::open(&edges_path).unwrap())).unwrap();
    assert_eq!(&pairs, ctx.pairs());
    assert_eq!(build_graph(&pairs, 1), *ctx.graph());
}

#[test]
fn python_list_literals_are_accepted() {
    let lists = read_token_lists(BufReader::new(
        "['서울', '맛집']\n[\"날씨\", \"오늘\"]\n".as_bytes(),
    ))
    .unwrap();
    assert_eq!(lists, vec![vec!["서울", "맛집"], vec!["날씨", "오늘"]]);
}

#[test]
fn cleaned_description_table_feeds_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df_kdh.csv");
    std::fs::write(
        &path,
        concat!(
            ",title,description,description_cleaned\n",
            "0,서울 맛집,\"서울 맛집, 추천\",\"['서울', '맛집', '추천', '서울', '여행']\"\n",
            "1,서울 날씨,오늘 날씨,\"['서울', '날씨', '오늘']\"\n",
        ),
    )
    .unwrap();

    let lists = read_token_table(BufReader::new(File::open(&path).unwrap())).unwrap();
    let ctx = Pipeline::new(NetworkConfig::default())
        .unwrap()
        .run_token_lists(lists, &mut NoopObserver)
        .into_context()
        .unwrap();

    let from_documents = Pipeline::new(NetworkConfig::default())
        .unwrap()
        .run(&seoul_docs(), &mut NoopObserver)
        .into_context()
        .unwrap();
    assert_eq!(ctx.pairs(), from_documents.pairs());
    assert_eq!(ctx.graph(), from_documents.graph());
}

#[test]
fn single_character_tokens_cannot_be_configured() {
    let err = Pipeline::new(NetworkConfig::default().with_min_token_length(1)).unwrap_err();
    assert!(matches!(err, NetworkError::InvalidConfig(_)));

    let spec = RunSpec::from_json(r#"{ "v": 1, "tokenizer": { "min_token_length": 1 } }"#).unwrap();
    assert!(ValidationEngine::with_defaults().resolve(&spec).is_err());
}

#[test]
fn edge_list_requires_named_columns() {
    let err = read_edge_list(BufReader::new("a,b,weight\n서울,맛집,3\n".as_bytes())).unwrap_err();
    match err {
        NetworkError::MissingField { field, .. } => assert_eq!(field, "Source"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}
