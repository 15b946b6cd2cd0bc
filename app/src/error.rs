use err_derive::Error;

use infra::persistence::StorageError;

use crate::menu::ItemId;

#[derive(Debug, Error)]
pub enum BazaarError {
    #[error(display = "storage failure")]
    Storage(#[error(source)] #[error(from)] StorageError),
    #[error(display = "the cart is empty")]
    EmptyCart,
    #[error(display = "a buyer name is required")]
    MissingBuyer,
    #[error(display = "no menu item with id {}", _0)]
    UnknownItem(ItemId),
    #[error(display = "menu item id {} appears more than once", _0)]
    DuplicateMenuItem(ItemId),
    #[error(display = "passwords do not match")]
    PasswordMismatch,
    #[error(display = "password must not be empty")]
    EmptyPassword,
}
