//! Common test helpers and fixtures shared across the test suite.

#![allow(dead_code)]

use vshelf::{
    CatalogDocument, DocumentRef, HoldingsSnapshot, InMemoryStore, ItemCopy, LccTree,
};

/// Call numbers of the sample shelf, in shelving order.
pub const SAMPLE_SHELF: &[&str] = &[
    "PS3537 .A426 Z9",
    "PS3537 .A426 Z9 1950",
    "PS3545 .I345 A6 1989",
    "QA9 .B64",
    "QA76 .A1 1990",
    "QA76.5 .K5",
    "QA76.73 .C15 S63 2021",
    "QA76.73 .C15 S63 2021 v.2",
    "QA76.73 .J38 2019",
    "QA76.76 .O63 L56 2005",
    "QA76.9 .D3 D37 2003",
    "QA101 .S6",
    "QA273 .F4",
    "QA300 .A4",
    "QB43.3 .S24 2008",
    "QC21.3 .H35 2011",
    "QD31.3 .B76 2012",
];

/// Document id of the sample shelf entry at `index`.
pub fn sample_id(index: usize) -> String {
    format!("doc{index:02}")
}

/// The sample shelf as catalog documents.
pub fn sample_documents() -> Vec<CatalogDocument> {
    SAMPLE_SHELF
        .iter()
        .enumerate()
        .map(|(i, cn)| CatalogDocument::new(&sample_id(i), cn))
        .collect()
}

/// An in-memory store over the sample shelf, with ordinary available
/// holdings for every document.
pub fn sample_store() -> InMemoryStore {
    let mut store = InMemoryStore::from_documents(sample_documents());
    for i in 0..SAMPLE_SHELF.len() {
        store.set_holdings(
            &sample_id(i),
            HoldingsSnapshot::builder()
                .copy(ItemCopy::new("ALDERMAN", "STACKS"))
                .language("English")
                .build(),
        );
    }
    store
}

/// A store of `count` documents with call numbers QA1..QA`count`.
pub fn numbered_store(count: usize) -> InMemoryStore {
    InMemoryStore::from_documents(
        (1..=count).map(|n| CatalogDocument::new(&format!("n{n:04}"), &format!("QA{n} .A1"))),
    )
}

/// The bundled LCC outline.
pub fn bundled_tree() -> LccTree {
    LccTree::bundled().expect("bundled outline loads")
}

/// Ids of the catalog entries of a document list.
pub fn ids(documents: &[DocumentRef]) -> Vec<String> {
    documents
        .iter()
        .filter_map(DocumentRef::id)
        .map(str::to_string)
        .collect()
}

/// A small outline table in CSV form, used by table-loading tests.
pub const SMALL_OUTLINE: &str = "\
id,range,name,ascii_name,note,parent_id
M,M,Music,,,
M1-5000,M1-5000,Music,,,M
M1-1,M1-1,Collections,,,M1-5000
ML,ML,Literature on music,,,M
ML1-3930,ML1-3930,Literature on music,,,ML
ML410,ML410,Biography of composers,,Individual composers A-Z,ML1-3930
MT,MT,Instruction and study,,,M
MT1-960,MT1-960,Instruction and study,,,MT
";
