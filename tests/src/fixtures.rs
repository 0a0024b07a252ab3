//! A small product catalog exercising every kind of relation.

use joinery::schema::{
    BatchConfig, Field, JunctionBatchConfig, JunctionConfig, ObjectType, TableConfig, TableName,
};
use joinery::Schema;

/// The tenant a request runs for; selects the schema of tenant tables.
#[derive(Debug)]
pub struct Tenant(pub String);

pub fn catalog() -> Schema {
    Schema::builder()
        .object(query())
        .object(product())
        .object(
            ObjectType::new("Variant")
                .table(TableConfig::new("productVariants").unique_key("id"))
                .field(Field::scalar("id"))
                .field(Field::scalar("name"))
                .field(Field::scalar("productId"))
                .field(
                    Field::list("reviews", "Review").batch(BatchConfig::new("variantId", "id")),
                ),
        )
        .object(
            ObjectType::new("Review")
                .table(TableConfig::new("reviews").unique_key("id"))
                .field(Field::scalar("id"))
                .field(Field::scalar("body")),
        )
        .object(
            ObjectType::new("Maker")
                .table(TableConfig::new("makers").unique_key("id"))
                .field(Field::scalar("id"))
                .field(Field::scalar("name")),
        )
        .object(
            ObjectType::new("Tag")
                .table(TableConfig::new("tags").unique_key("id"))
                .field(Field::scalar("id"))
                .field(Field::scalar("label")),
        )
        .object(
            ObjectType::new("TenantProduct")
                .table(
                    TableConfig::dynamic(|_, cx| {
                        let tenant = cx
                            .get::<Tenant>()
                            .map_or("public", |tenant| tenant.0.as_str());
                        TableName::ident(format!("{tenant}.products"))
                    })
                    .unique_key("id"),
                )
                .field(Field::scalar("id"))
                .field(Field::scalar("name")),
        )
        .object(
            ObjectType::new("Region")
                .table(TableConfig::new("regions").composite_key(["country", "code"]))
                .field(Field::scalar("country"))
                .field(Field::scalar("code"))
                .field(Field::scalar("name")),
        )
        .object(ObjectType::new("Banner").field(Field::scalar("text")))
        .build()
        .unwrap()
}

fn query() -> ObjectType {
    ObjectType::new("Query")
        .field(Field::object("product", "Product").filter(|filter, args, _| {
            if let Some(id) = args.get("id") {
                filter.eq("id", id.clone());
            }
        }))
        .field(Field::list("products", "Product"))
        .field(
            Field::list("productPage", "Product")
                .paginate()
                .order_by(|order, _, _| {
                    order.by("id");
                }),
        )
        .field(
            Field::list("productFeed", "Product")
                .paginate()
                .sort_key(|key, _, _| {
                    key.by("id");
                }),
        )
        .field(Field::list("tenantProducts", "TenantProduct"))
        .field(Field::list("regions", "Region"))
        .field(Field::object("banner", "Banner"))
        .field(Field::scalar("version"))
}

fn product() -> ObjectType {
    ObjectType::new("Product")
        .table(TableConfig::new("products").unique_key("id"))
        .field(Field::scalar("id"))
        .field(Field::scalar("name"))
        .field(Field::scalar("price").column("unit_price"))
        .field(Field::scalar("label").expression(|table, _, _| format!("upper({table}.name)")))
        .field(Field::scalar("slug").ignored().dependencies(["name"]))
        .field(Field::list("variants", "Variant").join(|join, _, _| {
            join.on("id", "productId");
        }))
        .field(
            Field::list("variantsBatched", "Variant").batch(BatchConfig::new("productId", "id")),
        )
        .field(
            Field::list("variantPage", "Variant")
                .paginate()
                .sort_key(|key, _, _| {
                    key.by("id");
                })
                .join(|join, _, _| {
                    join.on("id", "productId");
                }),
        )
        .field(
            Field::list("variantPageBatched", "Variant")
                .paginate()
                .sort_key(|key, _, _| {
                    key.by("id");
                })
                .batch(BatchConfig::new("productId", "id")),
        )
        .field(Field::object("maker", "Maker").batch(BatchConfig::new("id", "makerId")))
        .field(
            Field::list("tags", "Tag").junction(
                JunctionConfig::new("product_tags")
                    .from_parent(|join, _, _| {
                        join.on("id", "product_id");
                    })
                    .to_child(|join, _, _| {
                        join.on("tag_id", "id");
                    }),
            ),
        )
        .field(
            Field::list("tagsBatched", "Tag").junction(
                JunctionConfig::new("product_tags").batch(
                    JunctionBatchConfig::new("product_id", "id").join(|join, _, _| {
                        join.on("tag_id", "id");
                    }),
                ),
            ),
        )
        .field(
            Field::list("tagPageBatched", "Tag").paginate().junction(
                JunctionConfig::new("product_tags")
                    .sort_key(|key, _, _| {
                        key.by("tag_id");
                    })
                    .batch(
                        JunctionBatchConfig::new("product_id", "id").join(|join, _, _| {
                            join.on("tag_id", "id");
                        }),
                    ),
            ),
        )
}
