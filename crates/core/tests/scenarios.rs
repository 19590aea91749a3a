//! End-to-end flows through the public Stockroom API.

use stockroom_core::{
    Action, AuthConfig, CategoryUpdate, Credentials, Envelope, Error, Identity, ItemUpdate,
    NewCategory, NewItem, Registration, Role, StockAction, Stockroom,
};

fn stockroom(require_live_session: bool) -> Stockroom {
    Stockroom::open_in_memory(AuthConfig {
        token_secret: Some("integration-test-secret".into()),
        require_live_session,
        ..AuthConfig::default()
    })
    .unwrap()
}

fn register(room: &Stockroom, username: &str, role: Role) {
    room.auth()
        .register(&Registration {
            full_name: format!("{username} full name"),
            username: username.into(),
            password: "pw123456".into(),
            role,
        })
        .unwrap();
}

fn login(room: &Stockroom, username: &str) -> String {
    room.auth()
        .login(&Credentials {
            username: username.into(),
            password: "pw123456".into(),
        })
        .unwrap()
}

fn rtx(category_id: i64, quantity: i64) -> NewItem {
    NewItem {
        name: "RTX".into(),
        category_id,
        quantity,
        price: 499.0,
        specification: "16GB GDDR6".into(),
    }
}

#[test]
fn register_then_login_yields_usable_token() {
    let room = stockroom(false);
    register(&room, "alice", Role::Admin);

    let token = login(&room, "alice");
    let identity = room.gate().authenticate(Some(&token)).unwrap();
    assert_eq!(
        identity,
        Identity {
            username: "alice".into(),
            role: Role::Admin
        }
    );

    let session = room.auth().current_session("alice").unwrap();
    assert_eq!(session.token, token);
}

#[test]
fn item_lifecycle_is_fully_audited() {
    let room = stockroom(false);
    register(&room, "alice", Role::Admin);
    let token = login(&room, "alice");

    let actor = room
        .gate()
        .authorize(Some(&token), StockAction::EditCategory)
        .unwrap();
    let vga = room
        .categories()
        .add(&NewCategory { name: "VGA".into() })
        .unwrap();

    let item = room.inventory().add(&rtx(vga.id, 10), &actor).unwrap();
    room.inventory()
        .update(
            &ItemUpdate {
                id: item.id,
                name: "RTX".into(),
                category_id: vga.id,
                quantity: 5,
                price: 499.0,
                specification: "16GB GDDR6".into(),
            },
            &actor,
        )
        .unwrap();

    let admin = room
        .gate()
        .authorize(Some(&token), StockAction::DeleteItem)
        .unwrap();
    room.inventory().delete(item.id, &admin).unwrap();

    let trail: Vec<_> = room
        .audit()
        .get_all()
        .unwrap()
        .into_iter()
        .map(|r| (r.item_id, r.action, r.quantity_change, r.performed_by))
        .collect();
    assert_eq!(
        trail,
        vec![
            (item.id, Action::Post, 10, "alice".to_string()),
            (item.id, Action::Update, -5, "alice".to_string()),
            (item.id, Action::Delete, 0, "alice".to_string()),
        ]
    );

    let err = room.inventory().get_by_id(item.id).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(room.audit().for_item(item.id).unwrap().len(), 3);
}

#[test]
fn audit_count_matches_successful_mutations() {
    let room = stockroom(false);
    let actor = Identity {
        username: "bob".into(),
        role: Role::User,
    };
    let vga = room
        .categories()
        .add(&NewCategory { name: "VGA".into() })
        .unwrap();

    let item = room.inventory().add(&rtx(vga.id, 3), &actor).unwrap();
    assert!(room.inventory().add(&rtx(vga.id, 3), &actor).is_err());
    assert!(room.inventory().add(&rtx(vga.id + 50, 3), &actor).is_err());
    assert!(room.inventory().delete(item.id + 50, &actor).is_err());
    room.inventory().delete(item.id, &actor).unwrap();

    assert_eq!(room.audit().get_all().unwrap().len(), 2);
}

#[test]
fn duplicate_category_is_a_conflict() {
    let room = stockroom(false);
    let categories = room.categories();
    categories.add(&NewCategory { name: "VGA".into() }).unwrap();

    let err = categories
        .add(&NewCategory { name: "VGA".into() })
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(err.code(), 400);
    assert_eq!(categories.get_all().unwrap().len(), 1);
}

#[test]
fn item_under_missing_category_writes_nothing() {
    let room = stockroom(false);
    let actor = Identity {
        username: "bob".into(),
        role: Role::User,
    };

    let err = room.inventory().add(&rtx(999, 1), &actor).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.code(), 404);
    assert!(room.inventory().get_all().unwrap().is_empty());
    assert!(room.audit().get_all().unwrap().is_empty());
}

#[test]
fn deleting_a_category_keeps_its_items() {
    let room = stockroom(false);
    let actor = Identity {
        username: "bob".into(),
        role: Role::User,
    };
    let vga = room
        .categories()
        .add(&NewCategory { name: "VGA".into() })
        .unwrap();
    let item = room.inventory().add(&rtx(vga.id, 1), &actor).unwrap();

    room.categories().delete(vga.id).unwrap();
    assert_eq!(room.inventory().get_by_id(item.id).unwrap().category_id, vga.id);

    let gpu = room
        .categories()
        .add(&NewCategory { name: "GPU".into() })
        .unwrap();
    let renamed = room
        .categories()
        .update(&CategoryUpdate {
            id: gpu.id,
            name: "Graphics".into(),
        })
        .unwrap();
    assert_eq!(renamed.name, "Graphics");
}

#[test]
fn passwords_never_leave_the_core() {
    let room = stockroom(false);
    register(&room, "alice", Role::User);

    let users = room.auth().get_all().unwrap();
    let json = serde_json::to_string(&Envelope::ok("users fetched", &users)).unwrap();
    assert!(!json.contains("pw123456"));
    assert!(!json.contains("$argon2"));
    assert!(users.iter().all(|u| u.password_hash == "-"));
}

#[test]
fn gate_outcomes() {
    let room = stockroom(false);
    register(&room, "alice", Role::Admin);
    register(&room, "bobby", Role::User);
    let admin_token = login(&room, "alice");
    let user_token = login(&room, "bobby");
    let gate = room.gate();

    assert_eq!(gate.authenticate(None).unwrap_err().code(), 401);
    assert_eq!(gate.authenticate(Some("garbage")).unwrap_err().code(), 400);

    let denied = gate
        .authorize(Some(&user_token), StockAction::DeleteCategory)
        .unwrap_err();
    assert!(matches!(denied, Error::NotAdmin));
    assert_eq!(denied.code(), 401);

    assert!(gate
        .authorize(Some(&user_token), StockAction::ViewStock)
        .is_ok());
    assert!(gate
        .authorize(Some(&admin_token), StockAction::ManageUsers)
        .is_ok());
}

#[test]
fn deleted_user_token_still_verifies_until_expiry() {
    let room = stockroom(false);
    register(&room, "alice", Role::User);
    let token = login(&room, "alice");

    room.auth().delete("alice").unwrap();
    assert!(room.gate().authenticate(Some(&token)).is_ok());
}

#[test]
fn logout_revokes_only_with_live_sessions() {
    let relaxed = stockroom(false);
    register(&relaxed, "alice", Role::User);
    let token = login(&relaxed, "alice");
    relaxed.auth().logout("alice").unwrap();
    assert!(relaxed.gate().authenticate(Some(&token)).is_ok());

    let strict = stockroom(true);
    register(&strict, "alice", Role::User);
    let token = login(&strict, "alice");
    assert!(strict.gate().authenticate(Some(&token)).is_ok());
    strict.auth().logout("alice").unwrap();
    assert!(matches!(
        strict.gate().authenticate(Some(&token)),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn low_stock_report() {
    let room = stockroom(false);
    let actor = Identity {
        username: "bob".into(),
        role: Role::User,
    };
    let vga = room
        .categories()
        .add(&NewCategory { name: "VGA".into() })
        .unwrap();

    for (name, quantity, price) in [("RTX", 10, 500.0), ("GTX", 1, 120.0), ("Arc", 3, 250.0)] {
        room.inventory()
            .add(
                &NewItem {
                    name: name.into(),
                    category_id: vga.id,
                    quantity,
                    price,
                    specification: "spec".into(),
                },
                &actor,
            )
            .unwrap();
    }

    let report = room.audit().report_stock(3).unwrap();
    assert_eq!(report.total_items, 2);
    assert_eq!(report.total_quantity, 4);
    assert_eq!(report.total_inventory_value, 120.0 + 750.0);
    assert_eq!(report.items[0].name, "GTX");
}

#[test]
fn error_envelope_shape() {
    let room = stockroom(false);
    let err = room.inventory().get_by_id(42).unwrap_err();
    let value = serde_json::to_value(Envelope::<()>::error(&err)).unwrap();

    assert_eq!(value["code"], 404);
    assert_eq!(value["status"], "status not found");
    assert!(value["message"].as_str().unwrap().contains("item 42"));
}
