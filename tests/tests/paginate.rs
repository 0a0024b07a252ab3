use joinery::{
    cursor,
    stmt::{Connection, Value},
    Flavor, Selection,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{execute, json, row, setup, ScriptedDriver};

fn id_cursor(id: i64) -> String {
    let values = [("id".to_string(), Value::I64(id))].into_iter().collect();
    cursor::object_to_cursor(&values).unwrap()
}

/// `field { totalCount pageInfo { .. } edges { cursor node { <fields> } } }`
fn connection(field: &str, fields: &[&str]) -> Selection {
    Selection::new(field)
        .fields(["totalCount"])
        .select(Selection::new("pageInfo").fields(["hasNextPage", "hasPreviousPage"]))
        .select(
            Selection::new("edges")
                .fields(["cursor"])
                .select(Selection::new("node").fields(fields.iter().copied())),
        )
}

#[tokio::test]
async fn keyset_page_fetches_one_extra_row() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 2, "name" => "Lamp"),
            row!("id" => 3, "name" => "Rug"),
            row!("id" => 4, "name" => "Sofa"),
        ],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = connection("productFeed", &["name"])
        .argument("first", 2)
        .argument("after", id_cursor(1));
    let page = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&page),
        json!({
            "edges": [
                { "cursor": id_cursor(2), "node": { "id": 2, "name": "Lamp" } },
                { "cursor": id_cursor(3), "node": { "id": 3, "name": "Rug" } },
            ],
            "pageInfo": {
                "hasNextPage": true,
                "hasPreviousPage": false,
                "startCursor": id_cursor(2),
                "endCursor": id_cursor(3),
            },
        })
    );

    let query = log.pop().unwrap();
    assert_eq!(
        query.sql,
        r#"SELECT
  "productFeed"."id" AS "id",
  "productFeed"."name" AS "name"
FROM (
  SELECT "productFeed".*
  FROM "products" "productFeed"
  WHERE "productFeed"."id" > ($1)
  ORDER BY "productFeed"."id" ASC
  LIMIT 3
) "productFeed"
ORDER BY "productFeed"."id" ASC"#
    );
    assert_eq!(
        query.params.values().cloned().collect::<Vec<_>>(),
        vec![Value::I64(1)]
    );
}

#[tokio::test]
async fn keyset_last_page_reads_backward() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 9, "name" => "Vase"),
            row!("id" => 8, "name" => "Stool"),
            row!("id" => 7, "name" => "Shelf"),
        ],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = connection("productFeed", &["name"])
        .argument("last", 2)
        .argument("before", id_cursor(10));
    let page = execute(&executor, &request).await.unwrap();

    let page = page.as_connection().unwrap();
    let ids: Vec<_> = page.nodes().map(|node| node.get("id").cloned()).collect();
    assert_eq!(ids, vec![Some(Value::I64(8)), Some(Value::I64(9))]);
    assert!(page.page_info.has_previous_page);
    assert!(!page.page_info.has_next_page);
    assert_eq!(page.total_count, None);

    let sql = log.pop().unwrap().sql;
    assert!(sql.contains(r#"WHERE "productFeed"."id" < ($1)"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "productFeed"."id" DESC"#), "{sql}");
}

#[tokio::test]
async fn offset_page_counts_every_row() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 3, "$total" => 5, "name" => "Rug"),
            row!("id" => 4, "$total" => 5, "name" => "Sofa"),
            row!("id" => 5, "$total" => 5, "name" => "Vase"),
        ],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = connection("productPage", &["name"])
        .argument("first", 2)
        .argument("after", cursor::offset_to_cursor(1));
    let page = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&page),
        json!({
            "edges": [
                { "cursor": cursor::offset_to_cursor(2), "node": { "id": 3, "name": "Rug" } },
                { "cursor": cursor::offset_to_cursor(3), "node": { "id": 4, "name": "Sofa" } },
            ],
            "pageInfo": {
                "hasNextPage": true,
                "hasPreviousPage": true,
                "startCursor": cursor::offset_to_cursor(2),
                "endCursor": cursor::offset_to_cursor(3),
            },
            "totalCount": 5,
        })
    );

    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "productPage"."id" AS "id",
  "productPage"."$total" AS "$total",
  "productPage"."name" AS "name"
FROM (
  SELECT "productPage".*, count(*) OVER () AS "$total"
  FROM "products" "productPage"
  ORDER BY "productPage"."id" ASC
  LIMIT 3 OFFSET 2
) "productPage"
ORDER BY "productPage"."id" ASC"#
    );
}

#[tokio::test]
async fn empty_offset_page() {
    let executor = setup(Flavor::Postgresql, ScriptedDriver::new());

    let request = connection("productPage", &["name"]).argument("first", 2);
    let page = execute(&executor, &request).await.unwrap();

    let page = page.as_connection().unwrap();
    assert!(page.edges.is_empty());
    assert_eq!(page.total_count, Some(0));
    assert!(!page.page_info.has_next_page);
    assert!(!page.page_info.has_previous_page);
}

#[tokio::test]
async fn joined_page_is_a_lateral_join() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 1, "variantPage__id" => 10, "variantPage__name" => "Oak"),
            row!("id" => 1, "variantPage__id" => 11, "variantPage__name" => "Pine"),
        ],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product")
        .argument("id", 1)
        .select(connection("variantPage", &["name"]).argument("first", 1));
    let product = execute(&executor, &request).await.unwrap();

    let page = product
        .get("variantPage")
        .and_then(Value::as_connection)
        .unwrap();
    assert_eq!(page.edges.len(), 1);
    assert_eq!(page.edges[0].cursor, id_cursor(10));
    assert!(page.page_info.has_next_page);

    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "product"."id" AS "id",
  "variantPage"."id" AS "variantPage__id",
  "variantPage"."name" AS "variantPage__name"
FROM "products" AS "product"
LEFT JOIN LATERAL (
  SELECT "variantPage".*
  FROM "productVariants" "variantPage"
  WHERE "product"."id" = "variantPage"."productId"
  ORDER BY "variantPage"."id" ASC
  LIMIT 2
) "variantPage" ON "product"."id" = "variantPage"."productId"
WHERE "product"."id" = $1
ORDER BY "variantPage"."id" ASC"#
    );
}

#[tokio::test]
async fn batched_pages_per_parent() {
    let driver = ScriptedDriver::new()
        .reply(
            r#"FROM (VALUES"#,
            vec![
                row!("id" => 10, "productId" => 1, "name" => "Oak"),
                row!("id" => 11, "productId" => 1, "name" => "Pine"),
            ],
        )
        .reply(
            r#"FROM "products""#,
            vec![row!("id" => 1), row!("id" => 2)],
        );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .select(connection("variantPageBatched", &["name"]).argument("first", 1));
    let products = execute(&executor, &request).await.unwrap();

    let pages: Vec<&Connection> = products
        .as_list()
        .unwrap()
        .iter()
        .map(|product| {
            product
                .get("variantPageBatched")
                .and_then(Value::as_connection)
                .unwrap()
        })
        .collect();

    assert_eq!(pages[0].edges.len(), 1);
    assert!(pages[0].page_info.has_next_page);
    assert_eq!(pages[0].edges[0].node.get("name"), Some(&Value::from("Oak")));

    // No variants is an empty page, not null
    assert!(pages[1].edges.is_empty());
    assert!(!pages[1].page_info.has_next_page);

    log.pop();
    let batch = log.pop().unwrap();
    assert_eq!(
        batch.sql,
        r#"SELECT
  "variantPageBatched"."id" AS "id",
  "variantPageBatched"."productId" AS "productId",
  "variantPageBatched"."name" AS "name"
FROM (VALUES ($1), ($2)) "temp"("id")
JOIN LATERAL (
  SELECT "variantPageBatched".*
  FROM "productVariants" "variantPageBatched"
  WHERE "variantPageBatched"."productId" = "temp"."id"
  ORDER BY "variantPageBatched"."id" ASC
  LIMIT 2
) "variantPageBatched" ON "variantPageBatched"."productId" = "temp"."id"
ORDER BY "variantPageBatched"."id" ASC"#
    );
    assert_eq!(batch.params.len(), 2);
}

#[tokio::test]
async fn junction_batch_pages_per_parent() {
    let driver = ScriptedDriver::new()
        .reply(
            r#"FROM (VALUES"#,
            vec![
                row!("id" => 5, "tag_id" => 5, "product_id" => 1, "label" => "oak"),
                row!("id" => 6, "tag_id" => 6, "product_id" => 1, "label" => "new"),
                row!("id" => 5, "tag_id" => 5, "product_id" => 2, "label" => "oak"),
            ],
        )
        .reply(
            r#"FROM "products""#,
            vec![row!("id" => 1), row!("id" => 2)],
        );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .select(connection("tagPageBatched", &["label"]).argument("first", 1));
    let products = execute(&executor, &request).await.unwrap();

    let pages: Vec<&Connection> = products
        .as_list()
        .unwrap()
        .iter()
        .map(|product| {
            product
                .get("tagPageBatched")
                .and_then(Value::as_connection)
                .unwrap()
        })
        .collect();

    let tag_cursor = |id: i64| {
        let values = [("tag_id".to_string(), Value::I64(id))].into_iter().collect();
        cursor::object_to_cursor(&values).unwrap()
    };

    // The shared tag lands on both pages, each page is cut on its own
    assert_eq!(pages[0].edges.len(), 1);
    assert_eq!(pages[0].edges[0].cursor, tag_cursor(5));
    assert_eq!(pages[0].edges[0].node.get("product_id"), Some(&Value::I64(1)));
    assert!(pages[0].page_info.has_next_page);

    assert_eq!(pages[1].edges.len(), 1);
    assert_eq!(pages[1].edges[0].cursor, tag_cursor(5));
    assert_eq!(pages[1].edges[0].node.get("product_id"), Some(&Value::I64(2)));
    assert_eq!(pages[1].edges[0].node.get("label"), Some(&Value::from("oak")));
    assert!(!pages[1].page_info.has_next_page);

    log.pop();
    let batch = log.pop().unwrap();
    assert!(log.is_empty());
    for fragment in [
        r#"FROM (VALUES ($1), ($2)) "temp"("id")"#,
        r#"LEFT JOIN LATERAL (
  SELECT "product_tags".*
  FROM "product_tags" "product_tags"
  WHERE "product_tags"."product_id" = "temp"."id"
  ORDER BY "product_tags"."tag_id" ASC
  LIMIT 2
) "product_tags" ON "product_tags"."product_id" = "temp"."id""#,
        r#"LEFT JOIN "tags" AS "tagPageBatched" ON "product_tags"."tag_id" = "tagPageBatched"."id""#,
        r#""product_tags"."tag_id" AS "tag_id""#,
    ] {
        assert!(batch.sql.contains(fragment), "{}", batch.sql);
    }
    assert_eq!(
        batch.params.values().cloned().collect::<Vec<_>>(),
        vec![Value::I64(1), Value::I64(2)]
    );
}

#[tokio::test]
async fn malformed_cursors_are_rejected_before_running() {
    let driver = ScriptedDriver::new();
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = connection("productFeed", &["name"]).argument("after", "not a cursor");
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_invalid_cursor());

    // A keyset cursor where an offset is expected
    let request = connection("productPage", &["name"]).argument("after", id_cursor(1));
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_invalid_cursor());

    // An offset cursor where a keyset is expected
    let request =
        connection("productFeed", &["name"]).argument("after", cursor::offset_to_cursor(4));
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_invalid_cursor());

    assert!(log.is_empty());
}

#[tokio::test]
async fn conflicting_page_arguments() {
    let driver = ScriptedDriver::new();
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = connection("productFeed", &["name"])
        .argument("first", 2)
        .argument("last", 2);
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_invalid_configuration());

    let request = connection("productPage", &["name"]).argument("last", 2);
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_invalid_configuration());

    assert!(log.is_empty());
}

#[tokio::test]
async fn sqlite_pages_with_keysets_at_the_root() {
    let driver = ScriptedDriver::new();
    let mut log = driver.log();
    let executor = setup(Flavor::Sqlite, driver);

    let request = connection("productFeed", &["name"])
        .argument("first", 2)
        .argument("after", id_cursor(1));
    execute(&executor, &request).await.unwrap();
    let sql = log.pop().unwrap().sql;
    assert!(sql.contains(r#""productFeed"."id" > (?1)"#), "{sql}");
    assert!(sql.contains("LIMIT 3"), "{sql}");

    let request = Selection::new("product")
        .argument("id", 1)
        .select(connection("variantPage", &["name"]).argument("first", 1));
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_unsupported_feature());

    let request = connection("productPage", &["name"]).argument("first", 1);
    let err = execute(&executor, &request).await.unwrap_err();
    assert!(err.is_unsupported_feature());

    assert!(log.is_empty());
}
