//! Command dispatch
//!
//! Every command resolves to one JSON envelope. Protected commands pass
//! through the access gate before touching a service.

use serde::Serialize;
use serde_json::Value;
use stockroom_core::{
    CategoryUpdate, Credentials, Envelope, Identity, ItemUpdate, NewCategory, NewItem,
    ProfileUpdate, Registration, Result, SessionCookie, StockAction, Stockroom,
};

use crate::cli::{
    ActivityCommand, CategoryCommand, Command, ItemArgs, ItemCommand, UserCommand,
};

#[derive(Serialize)]
struct LoginOutput {
    token: String,
    cookie: SessionCookie,
}

#[derive(Serialize)]
struct Availability<'a> {
    name: &'a str,
    exists: bool,
}

fn ok<T: Serialize>(message: &str, data: T) -> Result<Value> {
    Ok(serde_json::to_value(Envelope::ok(message, data))?)
}

fn created<T: Serialize>(message: &str, data: T) -> Result<Value> {
    Ok(serde_json::to_value(Envelope::created(message, data))?)
}

fn message(message: &str) -> Result<Value> {
    Ok(serde_json::to_value(Envelope::<()>::message(message))?)
}

fn new_item(args: ItemArgs) -> NewItem {
    NewItem {
        name: args.name,
        category_id: args.category_id,
        quantity: args.quantity,
        price: args.price,
        specification: args.specification,
    }
}

fn item_update(id: i64, args: ItemArgs) -> ItemUpdate {
    ItemUpdate {
        id,
        name: args.name,
        category_id: args.category_id,
        quantity: args.quantity,
        price: args.price,
        specification: args.specification,
    }
}

pub fn run(command: Command, token: Option<&str>, room: &Stockroom) -> Result<Value> {
    let authorize = |action: StockAction| -> Result<Identity> { room.gate().authorize(token, action) };

    match command {
        Command::Register(args) => {
            let user = room.auth().register(&Registration {
                full_name: args.full_name,
                username: args.username,
                password: args.password,
                role: args.role.into(),
            })?;
            created("register user success", user)
        }
        Command::Login(args) => {
            let auth = room.auth();
            let token = auth.login(&Credentials {
                username: args.username,
                password: args.password,
            })?;
            let cookie = auth.session_cookie(token.clone());
            ok("login user success", LoginOutput { token, cookie })
        }
        Command::Logout => {
            let identity = authorize(StockAction::Logout)?;
            room.auth().logout(&identity.username)?;
            message("logout user success")
        }
        Command::User(command) => run_user(command, &authorize, room),
        Command::Category(command) => run_category(command, &authorize, room),
        Command::Item(command) => run_item(command, &authorize, room),
        Command::Activity(command) => {
            authorize(StockAction::ViewAudit)?;
            match command {
                ActivityCommand::List => ok("get all activity success", room.audit().get_all()?),
                ActivityCommand::Item { item_id } => {
                    ok("get item activity success", room.audit().for_item(item_id)?)
                }
            }
        }
        Command::Report(args) => {
            authorize(StockAction::ViewStock)?;
            ok("report stock success", room.audit().report_stock(args.threshold)?)
        }
        Command::PruneSessions => {
            authorize(StockAction::ManageUsers)?;
            let removed = room.auth().prune_expired_sessions()?;
            ok("prune sessions success", serde_json::json!({ "removed": removed }))
        }
    }
}

fn run_user(
    command: UserCommand,
    authorize: &dyn Fn(StockAction) -> Result<Identity>,
    room: &Stockroom,
) -> Result<Value> {
    let auth = room.auth();
    match command {
        UserCommand::List => {
            authorize(StockAction::ViewUsers)?;
            ok("get all user success", auth.get_all()?)
        }
        UserCommand::Show { username } => {
            authorize(StockAction::ViewUsers)?;
            ok("get user success", auth.get_by_username(&username)?)
        }
        UserCommand::Exists { username } => {
            authorize(StockAction::ViewUsers)?;
            let exists = auth.check_available(&username)?;
            ok("check user success", Availability { name: &username, exists })
        }
        UserCommand::Update(args) => {
            authorize(StockAction::ManageUsers)?;
            let user = auth.update(&ProfileUpdate {
                username: args.username,
                full_name: args.full_name,
                password: args.password,
                role: args.role.into(),
            })?;
            ok("update user success", user)
        }
        UserCommand::Delete { username } => {
            authorize(StockAction::ManageUsers)?;
            auth.delete(&username)?;
            message("delete user success")
        }
    }
}

fn run_category(
    command: CategoryCommand,
    authorize: &dyn Fn(StockAction) -> Result<Identity>,
    room: &Stockroom,
) -> Result<Value> {
    let categories = room.categories();
    match command {
        CategoryCommand::List => {
            authorize(StockAction::ViewStock)?;
            ok("get all category success", categories.get_all()?)
        }
        CategoryCommand::Show { id } => {
            authorize(StockAction::ViewStock)?;
            ok("get category success", categories.get_by_id(id)?)
        }
        CategoryCommand::Exists { name } => {
            authorize(StockAction::ViewStock)?;
            let exists = categories.check_available(&name)?;
            ok("check category success", Availability { name: &name, exists })
        }
        CategoryCommand::Add { name } => {
            authorize(StockAction::EditCategory)?;
            created("success add category", categories.add(&NewCategory { name })?)
        }
        CategoryCommand::Update { id, name } => {
            authorize(StockAction::EditCategory)?;
            ok(
                "success update category",
                categories.update(&CategoryUpdate { id, name })?,
            )
        }
        CategoryCommand::Delete { id } => {
            authorize(StockAction::DeleteCategory)?;
            categories.delete(id)?;
            message("success delete category")
        }
    }
}

fn run_item(
    command: ItemCommand,
    authorize: &dyn Fn(StockAction) -> Result<Identity>,
    room: &Stockroom,
) -> Result<Value> {
    let inventory = room.inventory();
    match command {
        ItemCommand::List => {
            authorize(StockAction::ViewStock)?;
            ok("success get all item", inventory.get_all()?)
        }
        ItemCommand::Show { id } => {
            authorize(StockAction::ViewStock)?;
            ok("success get item", inventory.get_by_id(id)?)
        }
        ItemCommand::ByCategory { category_id } => {
            authorize(StockAction::ViewStock)?;
            ok(
                "success get item by category",
                inventory.get_by_category(category_id)?,
            )
        }
        ItemCommand::Exists { name } => {
            authorize(StockAction::ViewStock)?;
            let exists = inventory.check_available(&name)?;
            ok("check item success", Availability { name: &name, exists })
        }
        ItemCommand::Add(args) => {
            let actor = authorize(StockAction::EditItem)?;
            created("success create item", inventory.add(&new_item(args), &actor)?)
        }
        ItemCommand::Update { id, item } => {
            let actor = authorize(StockAction::EditItem)?;
            ok(
                "success update item",
                inventory.update(&item_update(id, item), &actor)?,
            )
        }
        ItemCommand::Delete { id } => {
            let actor = authorize(StockAction::DeleteItem)?;
            inventory.delete(id, &actor)?;
            message("success delete item")
        }
    }
}
