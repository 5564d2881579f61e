use crate::*;

#[test]
fn test_select_all_ordered() {
    let stmt = SelectStmt::new("basic_info")
        .columns(["id", "user_id", "property_name"])
        .order_by("id");

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"SELECT "id", "user_id", "property_name" FROM "basic_info" ORDER BY "id""#);
    assert_eq!(result.param_count, 0);
}

#[test]
fn test_select_by_key() {
    let stmt = SelectStmt::new("room_setup")
        .columns(["id", "floor"])
        .where_(Condition::eq("property_id"))
        .order_by("id");

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"SELECT "id", "floor" FROM "room_setup" WHERE "property_id" = $1 ORDER BY "id""#);
    assert_eq!(result.param_count, 1);
}

#[test]
fn test_select_star_with_limit() {
    let stmt = SelectStmt::new("location_details")
        .where_(Condition::eq("property_id"))
        .limit(1);

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"SELECT * FROM "location_details" WHERE "property_id" = $1 LIMIT 1"#);
}

#[test]
fn test_exists_with_exclusion() {
    let stmt = SelectStmt::new("basic_info")
        .where_(Condition::eq("property_name"))
        .where_(Condition::not_eq("id"))
        .exists();

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"SELECT EXISTS(SELECT 1 FROM "basic_info" WHERE "property_name" = $1 AND "id" <> $2)"#);
    assert_eq!(result.param_count, 2);
}

#[test]
fn test_insert_returning() {
    let stmt = InsertStmt::new("id_proofs")
        .columns(["user_id", "property_id", "proof_type"])
        .returning(["id"]);

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"INSERT INTO "id_proofs" ("user_id", "property_id", "proof_type") VALUES ($1, $2, $3) RETURNING "id""#);
    assert_eq!(result.param_count, 3);
}

#[test]
fn test_update_numbers_where_after_set() {
    let stmt = UpdateStmt::new("pet_rules")
        .set(["pets_allowed", "pet_fee"])
        .where_(Condition::eq("id"));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"UPDATE "pet_rules" SET "pets_allowed" = $1, "pet_fee" = $2 WHERE "id" = $3"#);
    assert_eq!(result.param_count, 3);
}

#[test]
fn test_delete_by_owner() {
    let stmt = DeleteStmt::new("room_images").where_(Condition::eq("property_id"));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"DELETE FROM "room_images" WHERE "property_id" = $1"#);
}

#[test]
fn test_reserved_table_name_is_quoted() {
    let stmt = DeleteStmt::new("user").where_(Condition::eq("id"));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r#"DELETE FROM "user" WHERE "id" = $1"#);
}
