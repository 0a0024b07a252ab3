use joinery::{CancellationToken, Context, Flavor, Selection};
use tests::{execute, row, setup, ScriptedDriver};

fn products_with_variants() -> Selection {
    Selection::new("products")
        .fields(["name"])
        .select(Selection::new("variantsBatched").fields(["name"]))
}

#[tokio::test]
async fn cancelled_before_running() {
    let driver = ScriptedDriver::new();
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = executor
        .execute(&products_with_variants(), &Context::empty(), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(log.is_empty());
}

#[tokio::test]
async fn cancelled_while_waiting_on_the_database() {
    let driver = ScriptedDriver::new()
        .hang(r#"FROM "productVariants""#)
        .reply(r#"FROM "products""#, vec![row!("id" => 1, "name" => "Desk")]);
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        trigger.cancel();
    });

    let err = executor
        .execute(&products_with_variants(), &Context::empty(), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    // The batch statement was issued, its result never arrived
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn driver_errors_pass_through() {
    let driver = ScriptedDriver::new()
        .fail(r#"FROM "productVariants""#, "connection reset")
        .reply(r#"FROM "products""#, vec![row!("id" => 1, "name" => "Desk")]);
    let executor = setup(Flavor::Postgresql, driver);

    let err = execute(&executor, &products_with_variants())
        .await
        .unwrap_err();

    assert!(err.is_driver());
    assert!(err.to_string().contains("connection reset"), "{err}");
}

#[tokio::test]
async fn root_driver_error_stops_everything() {
    let driver = ScriptedDriver::new().fail(r#"FROM "products""#, "relation does not exist");
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let err = execute(&executor, &products_with_variants())
        .await
        .unwrap_err();

    assert!(err.is_driver());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn executors_are_shared_between_tasks() {
    let driver = ScriptedDriver::new()
        .reply(r#"FROM "products""#, vec![row!("id" => 1, "name" => "Desk")]);
    let log = driver.log();
    let executor = setup(Flavor::Postgresql, driver);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let executor = executor.clone();
            tokio::spawn(async move {
                let request = Selection::new("products").fields(["name"]);
                execute(&executor, &request).await
            })
        })
        .collect();

    for task in tasks {
        let products = task.await.unwrap().unwrap();
        assert_eq!(products.as_list().map(|products| products.len()), Some(1));
    }

    assert_eq!(log.len(), 4);
}
