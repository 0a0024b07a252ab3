use joinery::{stmt::Value, Flavor, Selection};
use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{execute, json, row, setup, ScriptedDriver};

fn desk_and_lamp() -> Vec<joinery::stmt::Row> {
    vec![
        row!("id" => 1, "name" => "Desk"),
        row!("id" => 2, "name" => "Lamp"),
    ]
}

#[tokio::test]
async fn batch_runs_one_statement_per_level() {
    let driver = ScriptedDriver::new()
        .reply(
            r#"FROM "productVariants""#,
            vec![
                row!("id" => 10, "productId" => 1, "name" => "Oak"),
                row!("id" => 11, "productId" => 1, "name" => "Pine"),
            ],
        )
        .reply(r#"FROM "products""#, desk_and_lamp());
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .fields(["name"])
        .select(Selection::new("variantsBatched").fields(["name"]));
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([
            {
                "id": 1,
                "name": "Desk",
                "variantsBatched": [
                    { "id": 10, "productId": 1, "name": "Oak" },
                    { "id": 11, "productId": 1, "name": "Pine" },
                ],
            },
            { "id": 2, "name": "Lamp", "variantsBatched": null },
        ])
    );

    assert_eq!(log.len(), 2);
    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "products"."id" AS "id",
  "products"."name" AS "name"
FROM "products" AS "products""#
    );

    let batch = log.pop().unwrap();
    assert_eq!(
        batch.sql,
        r#"SELECT
  "variantsBatched"."id" AS "id",
  "variantsBatched"."productId" AS "productId",
  "variantsBatched"."name" AS "name"
FROM "productVariants" AS "variantsBatched"
WHERE "variantsBatched"."productId" IN ($1, $2)"#
    );
    assert_eq!(
        batch.params.values().cloned().collect::<Vec<_>>(),
        vec![Value::I64(1), Value::I64(2)]
    );
}

#[tokio::test]
async fn to_one_batch_dedupes_its_scope() {
    let driver = ScriptedDriver::new()
        .reply(r#"FROM "makers""#, vec![row!("id" => 7, "name" => "Acme")])
        .reply(
            r#"FROM "products""#,
            vec![
                row!("id" => 1, "makerId" => 7),
                row!("id" => 2, "makerId" => 7),
                row!("id" => 3, "makerId" => 8),
            ],
        );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products").select(Selection::new("maker").fields(["name"]));
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([
            { "id": 1, "makerId": 7, "maker": { "id": 7, "name": "Acme" } },
            { "id": 2, "makerId": 7, "maker": { "id": 7, "name": "Acme" } },
            { "id": 3, "makerId": 8, "maker": null },
        ])
    );

    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "products"."id" AS "id",
  "products"."makerId" AS "makerId"
FROM "products" AS "products""#
    );
    let batch = log.pop().unwrap();
    assert_eq!(
        batch.sql,
        r#"SELECT
  "maker"."id" AS "id",
  "maker"."name" AS "name"
FROM "makers" AS "maker"
WHERE "maker"."id" IN ($1, $2)"#
    );
    assert_eq!(
        batch.params.values().cloned().collect::<Vec<_>>(),
        vec![Value::I64(7), Value::I64(8)]
    );
}

#[tokio::test]
async fn empty_scope_skips_the_statement() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![row!("id" => 1, "makerId" => Value::Null)],
    );
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products").select(Selection::new("maker").fields(["name"]));
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([{ "id": 1, "makerId": null, "maker": null }])
    );
    assert_eq!(log.len(), 1);
    assert_eq!(log.count(r#"FROM "makers""#), 0);
}

#[tokio::test]
async fn no_parents_no_batch() {
    let driver = ScriptedDriver::new();
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .select(Selection::new("variantsBatched").fields(["name"]));
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(products, Value::List(vec![]));
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn sibling_batches_and_nested_batches() {
    let driver = ScriptedDriver::new()
        .reply(
            r#"FROM "reviews""#,
            vec![row!("id" => 100, "variantId" => 11, "body" => "Sturdy")],
        )
        .reply(
            r#"FROM "productVariants""#,
            vec![
                row!("id" => 10, "productId" => 1, "name" => "Oak"),
                row!("id" => 11, "productId" => 2, "name" => "Brass"),
            ],
        )
        .reply(r#"FROM "makers""#, vec![row!("id" => 7, "name" => "Acme")])
        .reply(
            r#"FROM "products""#,
            vec![
                row!("id" => 1, "makerId" => 7),
                row!("id" => 2, "makerId" => 7),
            ],
        );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .select(Selection::new("maker").fields(["name"]))
        .select(
            Selection::new("variantsBatched")
                .fields(["name"])
                .select(Selection::new("reviews").fields(["body"])),
        );
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([
            {
                "id": 1,
                "makerId": 7,
                "maker": { "id": 7, "name": "Acme" },
                "variantsBatched": [
                    { "id": 10, "productId": 1, "name": "Oak", "reviews": null },
                ],
            },
            {
                "id": 2,
                "makerId": 7,
                "maker": { "id": 7, "name": "Acme" },
                "variantsBatched": [
                    {
                        "id": 11,
                        "productId": 2,
                        "name": "Brass",
                        "reviews": [{ "id": 100, "variantId": 11, "body": "Sturdy" }],
                    },
                ],
            },
        ])
    );

    // The root, one statement per sibling batch, then the nested batch
    assert_eq!(log.len(), 4);
    assert_eq!(log.count(" IN ("), 3);
    assert_eq!(log.sql().last().map(|sql| sql.contains(r#"FROM "reviews""#)), Some(true));

    log.pop();
    log.pop();
    log.pop();
    assert_eq!(
        log.pop_params().unwrap(),
        vec![Value::I64(10), Value::I64(11)]
    );
}

#[tokio::test]
async fn junction_batch_keeps_one_child_per_parent() {
    let driver = ScriptedDriver::new()
        .reply(
            r#"FROM "product_tags""#,
            vec![
                row!("id" => 5, "product_id" => 1, "label" => "oak"),
                row!("id" => 6, "product_id" => 1, "label" => "new"),
                row!("id" => 5, "product_id" => 2, "label" => "oak"),
            ],
        )
        .reply(r#"FROM "products""#, desk_and_lamp());
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .select(Selection::new("tagsBatched").fields(["label"]));
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([
            {
                "id": 1,
                "tagsBatched": [
                    { "id": 5, "product_id": 1, "label": "oak" },
                    { "id": 6, "product_id": 1, "label": "new" },
                ],
            },
            {
                "id": 2,
                "tagsBatched": [{ "id": 5, "product_id": 2, "label": "oak" }],
            },
        ])
    );

    log.pop();
    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "tagsBatched"."id" AS "id",
  "product_tags"."product_id" AS "product_id",
  "tagsBatched"."label" AS "label"
FROM "product_tags" AS "product_tags"
LEFT JOIN "tags" AS "tagsBatched" ON "product_tags"."tag_id" = "tagsBatched"."id"
WHERE "product_tags"."product_id" IN ($1, $2)"#
    );
}
