//! Shared schema builders for tests and benches.

use seedforge_core::schema::{
    Column, Constraint, ForeignKeyAction, LogicalType, Schema, Table,
};

/// A NOT NULL integer PK column named `id` plus its constraint.
pub fn with_int_pk(table: &mut Table) {
    let mut id = Column::new("id", LogicalType::Integer);
    id.nullable = false;
    table.columns.push(id);
    table.constraints.push(Constraint::PrimaryKey {
        columns: vec!["id".to_string()],
    });
}

/// Add a single-column FK to `table`.
pub fn with_fk(table: &mut Table, column: &str, target: &str, nullable: bool) {
    let mut col = Column::new(column, LogicalType::Integer);
    col.nullable = nullable;
    table.columns.push(col);
    table.constraints.push(Constraint::ForeignKey {
        columns: vec![column.to_string()],
        referenced_table: target.to_string(),
        referenced_columns: vec!["id".to_string()],
        on_delete: ForeignKeyAction::NoAction,
        on_update: ForeignKeyAction::NoAction,
    });
}

/// `countries <- regions <- cities`, integer PKs, NOT NULL FKs.
pub fn linear_chain_schema() -> Schema {
    let mut countries = Table::new("countries");
    with_int_pk(&mut countries);

    let mut regions = Table::new("regions");
    with_int_pk(&mut regions);
    with_fk(&mut regions, "country_id", "countries", false);

    let mut cities = Table::new("cities");
    with_int_pk(&mut cities);
    with_fk(&mut cities, "region_id", "regions", false);

    Schema::from_tables(vec![countries, regions, cities]).expect("chain schema is valid")
}

/// `a.b_id (NULL) -> b` and `b.a_id (NOT NULL) -> a`: a mutual cycle with
/// exactly one nullable break point.
pub fn mutual_cycle_schema(a_nullable: bool, b_nullable: bool) -> Schema {
    let mut a = Table::new("a");
    with_int_pk(&mut a);
    with_fk(&mut a, "b_id", "b", a_nullable);

    let mut b = Table::new("b");
    with_int_pk(&mut b);
    with_fk(&mut b, "a_id", "a", b_nullable);

    Schema::from_tables(vec![a, b]).expect("cycle schema is valid")
}

/// `employees.manager_id (NULL) -> employees`.
pub fn self_reference_schema() -> Schema {
    let mut employees = Table::new("employees");
    with_int_pk(&mut employees);
    with_fk(&mut employees, "manager_id", "employees", true);
    Schema::from_tables(vec![employees]).expect("self-reference schema is valid")
}

/// A small ecommerce schema exercising most column kinds: unique emails,
/// personas, decimals, timestamps, enums-by-check, composite uniques.
pub fn ecommerce_schema() -> Schema {
    let mut users = Table::new("users");
    with_int_pk(&mut users);
    let mut email = Column::new("email", LogicalType::VarChar);
    email.nullable = false;
    email.length = Some(255);
    users.columns.push(email);
    let mut first_name = Column::new("first_name", LogicalType::VarChar);
    first_name.length = Some(100);
    users.columns.push(first_name);
    let mut last_name = Column::new("last_name", LogicalType::VarChar);
    last_name.length = Some(100);
    users.columns.push(last_name);
    users.columns.push(Column::new("bio", LogicalType::Text));
    let mut created_at = Column::new("created_at", LogicalType::Timestamp);
    created_at.nullable = false;
    users.columns.push(created_at);
    users.constraints.push(Constraint::Unique {
        columns: vec!["email".to_string()],
    });

    let mut products = Table::new("products");
    with_int_pk(&mut products);
    let mut sku = Column::new("sku", LogicalType::VarChar);
    sku.nullable = false;
    sku.length = Some(12);
    products.columns.push(sku);
    let mut price = Column::new("price", LogicalType::Decimal);
    price.nullable = false;
    price.precision = Some(8);
    price.scale = Some(2);
    products.columns.push(price);
    products.constraints.push(Constraint::Unique {
        columns: vec!["sku".to_string()],
    });
    products.constraints.push(Constraint::Check {
        expression: "price > 0".to_string(),
        columns: vec!["price".to_string()],
    });

    let mut orders = Table::new("orders");
    with_int_pk(&mut orders);
    with_fk(&mut orders, "user_id", "users", false);
    let mut status = Column::new("status", LogicalType::VarChar);
    status.nullable = false;
    status.length = Some(20);
    orders.columns.push(status);
    orders.constraints.push(Constraint::Check {
        expression: "status IN ('pending', 'paid', 'shipped')".to_string(),
        columns: vec!["status".to_string()],
    });

    let mut order_items = Table::new("order_items");
    with_int_pk(&mut order_items);
    with_fk(&mut order_items, "order_id", "orders", false);
    with_fk(&mut order_items, "product_id", "products", false);
    let mut qty = Column::new("qty", LogicalType::Integer);
    qty.nullable = false;
    order_items.columns.push(qty);
    order_items.constraints.push(Constraint::Check {
        expression: "qty BETWEEN 1 AND 10".to_string(),
        columns: vec!["qty".to_string()],
    });
    order_items.constraints.push(Constraint::Unique {
        columns: vec!["order_id".to_string(), "product_id".to_string()],
    });

    Schema::from_tables(vec![users, products, orders, order_items])
        .expect("ecommerce schema is valid")
}
