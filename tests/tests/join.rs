use joinery::{Flavor, Selection};
use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{execute, json, row, setup, ScriptedDriver};

fn desk_with_variants() -> ScriptedDriver {
    ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 1, "name" => "Desk", "variants__id" => 10, "variants__name" => "Oak"),
            row!("id" => 1, "name" => "Desk", "variants__id" => 11, "variants__name" => "Pine"),
        ],
    )
}

#[tokio::test]
async fn joined_children_fold_into_their_parent() {
    let driver = desk_with_variants();
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product")
        .argument("id", 1)
        .fields(["name"])
        .select(Selection::new("variants").fields(["name"]));
    let product = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&product),
        json!({
            "id": 1,
            "name": "Desk",
            "variants": [
                { "id": 10, "name": "Oak" },
                { "id": 11, "name": "Pine" },
            ],
        })
    );

    // One statement for the whole tree
    assert_eq!(log.len(), 1);
    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "product"."id" AS "id",
  "product"."name" AS "name",
  "variants"."id" AS "variants__id",
  "variants"."name" AS "variants__name"
FROM "products" AS "product"
LEFT JOIN "productVariants" "variants" ON "product"."id" = "variants"."productId"
WHERE "product"."id" = $1"#
    );
}

#[tokio::test]
async fn unmatched_join_is_an_empty_list() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 1, "name" => "Desk", "variants__id" => 10, "variants__name" => "Oak"),
            row!(
                "id" => 2,
                "name" => "Lamp",
                "variants__id" => joinery::stmt::Value::Null,
                "variants__name" => joinery::stmt::Value::Null,
            ),
        ],
    );
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products")
        .fields(["name"])
        .select(Selection::new("variants").fields(["name"]));
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([
            { "id": 1, "name": "Desk", "variants": [{ "id": 10, "name": "Oak" }] },
            { "id": 2, "name": "Lamp", "variants": [] },
        ])
    );
}

#[tokio::test]
async fn same_field_under_two_aliases() {
    let driver = ScriptedDriver::new();
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product")
        .argument("id", 1)
        .select(Selection::new("variants").alias("first").fields(["name"]))
        .select(Selection::new("variants").alias("second").fields(["name"]));
    execute(&executor, &request).await.unwrap();

    let sql = log.pop().unwrap().sql;
    assert!(sql.contains(r#""first"."name" AS "first__name""#), "{sql}");
    assert!(sql.contains(r#""second"."name" AS "second__name""#), "{sql}");
    let join = r#"LEFT JOIN "productVariants" "second" ON "product"."id" = "second"."productId""#;
    assert!(sql.contains(join), "{sql}");
}

#[tokio::test]
async fn junction_joins_through_the_link_table() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 1, "tags__id" => 5, "tags__label" => "oak"),
            row!("id" => 1, "tags__id" => 6, "tags__label" => "new"),
        ],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product")
        .argument("id", 1)
        .select(Selection::new("tags").fields(["label"]));
    let product = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&product),
        json!({
            "id": 1,
            "tags": [
                { "id": 5, "label": "oak" },
                { "id": 6, "label": "new" },
            ],
        })
    );
    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "product"."id" AS "id",
  "tags"."id" AS "tags__id",
  "tags"."label" AS "tags__label"
FROM "products" AS "product"
LEFT JOIN "product_tags" "product_tags" ON "product"."id" = "product_tags"."product_id"
LEFT JOIN "tags" "tags" ON "product_tags"."tag_id" = "tags"."id"
WHERE "product"."id" = $1"#
    );
}

#[tokio::test]
async fn missing_columns_are_reported() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![row!("id" => 1)],
    );
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product").argument("id", 1).fields(["name"]);
    let err = execute(&executor, &request).await.unwrap_err();

    assert!(err.is_invalid_result());
    assert!(err.to_string().contains("name"), "{err}");
}
