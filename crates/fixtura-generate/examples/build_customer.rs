use fixtura_core::{
    ElementKind, FieldKind, FieldMeta, FieldSchema, InvalidityKind, ScalarType, SchemaCatalog,
    TypeSchema, ValueFormat,
};
use fixtura_generate::FixtureBuilder;

fn catalog() -> SchemaCatalog {
    SchemaCatalog::new()
        .with_type(
            TypeSchema::new("Customer")
                .with_default_locales(["en", "fr-FR"])
                .field(FieldSchema::new(
                    "firstName",
                    FieldKind::scalar(ScalarType::Text),
                    FieldMeta::default().with_length(2, 30),
                ))
                .field(FieldSchema::new(
                    "email",
                    FieldKind::scalar(ScalarType::Text),
                    FieldMeta::default().with_format(ValueFormat::Email),
                ))
                .field(
                    FieldSchema::new(
                        "addresses",
                        FieldKind::list_of(ElementKind::object("Address")),
                        FieldMeta::default(),
                    )
                    .with_list_bounds(1, 3),
                ),
        )
        .with_type(
            TypeSchema::new("Address")
                .field(FieldSchema::new(
                    "street",
                    FieldKind::scalar(ScalarType::Text),
                    FieldMeta::default().with_length(5, 60).with_forbidden("#$"),
                ))
                .field(FieldSchema::new(
                    "city",
                    FieldKind::scalar(ScalarType::Text),
                    FieldMeta::default(),
                )),
        )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter("info")
        .init();

    let catalog = catalog();
    let customer = FixtureBuilder::new(&catalog, "Customer")
        .with_seed(7)
        .with_fixed_list_size("addresses", 2)
        .invalidate("addresses/*/street", InvalidityKind::ContainsForbiddenCharacters)
        .set_value("addresses/[1]/city", "Moscow")
        .build()?;

    println!("{}", serde_json::to_string_pretty(&customer.to_json())?);
    Ok(())
}
