use joinery::{stmt::Value, CancellationToken, Context, Executor, Flavor, Selection};
use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{execute, fixtures, json, row, setup, ScriptedDriver};

#[tokio::test]
async fn scalar_fields_of_one_table() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![row!("id" => 1, "name" => "Desk")],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product").argument("id", 1).fields(["name"]);
    let product = execute(&executor, &request).await.unwrap();

    assert_eq!(json(&product), json!({ "id": 1, "name": "Desk" }));

    assert_eq!(log.len(), 1);
    let query = log.pop().unwrap();
    assert_eq!(
        query.sql,
        r#"SELECT
  "product"."id" AS "id",
  "product"."name" AS "name"
FROM "products" AS "product"
WHERE "product"."id" = $1"#
    );
    assert_eq!(
        query.params.values().cloned().collect::<Vec<_>>(),
        vec![Value::I64(1)]
    );
}

#[tokio::test]
async fn renamed_columns_expressions_and_dependencies() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![row!(
            "id" => 1,
            "price" => 250,
            "label" => "DESK",
            "name" => "Desk",
        )],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product")
        .argument("id", 1)
        .fields(["price", "label", "slug"]);
    let product = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&product),
        json!({ "id": 1, "price": 250, "label": "DESK", "name": "Desk" })
    );

    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "product"."id" AS "id",
  "product"."unit_price" AS "price",
  upper("product".name) AS "label",
  "product"."name" AS "name"
FROM "products" AS "product"
WHERE "product"."id" = $1"#
    );
}

#[tokio::test]
async fn aliased_selection_names_the_table() {
    let driver = ScriptedDriver::new();
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product")
        .alias("featured")
        .argument("id", 3)
        .fields(["name"]);
    let product = execute(&executor, &request).await.unwrap();

    // No rows for a single object is null
    assert_eq!(product, Value::Null);
    assert!(log
        .pop()
        .unwrap()
        .sql
        .contains(r#"FROM "products" AS "featured""#));
}

#[tokio::test]
async fn list_of_objects() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![
            row!("id" => 1, "name" => "Desk"),
            row!("id" => 2, "name" => "Lamp"),
        ],
    );
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("products").fields(["name"]);
    let products = execute(&executor, &request).await.unwrap();

    assert_eq!(
        json(&products),
        json!([
            { "id": 1, "name": "Desk" },
            { "id": 2, "name": "Lamp" },
        ])
    );
}

#[tokio::test]
async fn composite_key_is_fetched_as_one_column() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "regions""#,
        vec![
            row!("country#code" => "usny", "name" => "New York"),
            row!("country#code" => "usca", "name" => "California"),
        ],
    );
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("regions").fields(["name"]);
    let regions = execute(&executor, &request).await.unwrap();

    assert_eq!(regions.as_list().map(|regions| regions.len()), Some(2));
    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  NULLIF(CONCAT("regions"."country", "regions"."code"), '') AS "country#code",
  "regions"."name" AS "name"
FROM "regions" AS "regions""#
    );
}

#[tokio::test]
async fn table_name_comes_from_the_context() {
    let driver = ScriptedDriver::new();
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("tenantProducts").fields(["name"]);
    let cx = Context::new(fixtures::Tenant("acme".to_string()));
    let products = executor
        .execute(&request, &cx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(products, Value::List(vec![]));
    assert!(log
        .pop()
        .unwrap()
        .sql
        .contains(r#"FROM "acme"."products" AS "tenantProducts""#));
}

#[tokio::test]
async fn minified_aliases() {
    let driver = ScriptedDriver::new().reply(
        r#"FROM "products""#,
        vec![row!("b" => 1, "c" => "Desk", "d__e" => 10, "d__f" => "Oak")],
    );
    let mut log = driver.log();
    let executor = Executor::builder()
        .schema(fixtures::catalog())
        .minify_aliases(true)
        .build(driver)
        .unwrap();

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
            "variants": [{ "id": 10, "name": "Oak" }],
        })
    );
    assert_eq!(
        log.pop().unwrap().sql,
        r#"SELECT
  "a"."id" AS "b",
  "a"."name" AS "c",
  "d"."id" AS "d__e",
  "d"."name" AS "d__f"
FROM "products" AS "a"
LEFT JOIN "productVariants" "d" ON "a"."id" = "d"."productId"
WHERE "a"."id" = $1"#
    );
}

#[tokio::test]
async fn type_without_table_runs_nothing() {
    let driver = ScriptedDriver::new();
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("banner").fields(["text"]);
    let banner = execute(&executor, &request).await.unwrap();

    assert_eq!(banner, Value::Null);
    assert!(log.is_empty());
}

#[tokio::test]
async fn introspection_fields_are_skipped() {
    let driver = ScriptedDriver::new();
    let mut log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let request = Selection::new("product").fields(["__typename", "name"]);
    execute(&executor, &request).await.unwrap();

    assert!(!log.pop().unwrap().sql.contains("__typename"));
}

#[tokio::test]
async fn invalid_requests_are_configuration_errors() {
    let driver = ScriptedDriver::new();
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let err = execute(&executor, &Selection::new("version"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_configuration());

    let err = execute(&executor, &Selection::new("product").fields(["weight"]))
        .await
        .unwrap_err();
    assert!(err.is_invalid_configuration());
    assert!(err.to_string().contains("weight"), "{err}");

    assert!(log.is_empty());
}

#[test]
fn plan_and_compile_without_running() {
    let executor = setup(Flavor::Sqlite, ScriptedDriver::new());

    let request = Selection::new("product").argument("id", 1).fields(["name"]);
    let ast = executor.plan(&request, &Context::empty()).unwrap();
    let query = executor.compile(&ast).unwrap();

    assert_eq!(
        query.sql,
        r#"SELECT
  "product"."id" AS "id",
  "product"."name" AS "name"
FROM "products" AS "product"
WHERE "product"."id" = ?1"#
    );
}
