use std::path::PathBuf;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use solestore::config::Config;
use solestore::db::Store;
use solestore::domain::{OrderId, Price, Principal, ProductId};
use solestore::entities::{cart_entries, order_items, orders, product_images, users};
use solestore::services::{
    AdminError, AuthError, CartError, CheckoutError, ProductForm, Registration, UserForm,
};
use solestore::state::SharedState;

struct TestShop {
    state: SharedState,
    dir: PathBuf,
}

impl Drop for TestShop {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

impl TestShop {
    async fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("solestore-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut config = Config::default();
        config.general.database_path = format!("sqlite:{}?mode=rwc", dir.join("shop.db").display());
        config.catalog.images_path = dir.join("images").to_string_lossy().into_owned();
        config.security.argon2_memory_cost_kib = 1024;
        config.security.argon2_time_cost = 1;

        let store = Store::new(&config.general.database_path)
            .await
            .expect("Failed to open store");

        Self {
            state: SharedState::with_store(config, store),
            dir,
        }
    }

    fn store(&self) -> &Store {
        &self.state.store
    }

    async fn customer(&self, username: &str) -> Principal {
        self.state
            .auth_service
            .register(registration(username, "secret"))
            .await
            .expect("Failed to register customer")
    }

    async fn admin(&self, username: &str) -> Principal {
        self.state
            .auth_service
            .register_admin(registration(username, "secret"))
            .await
            .expect("Failed to register admin")
    }

    async fn product(&self, admin: &Principal, name: &str, price: f64) -> ProductId {
        self.state
            .admin_service
            .create_product(
                Some(admin),
                ProductForm {
                    name: name.to_string(),
                    price,
                    description: None,
                    category: "Nike".to_string(),
                },
            )
            .await
            .expect("Failed to create product")
            .id
    }
}

/// Counts of (orders, order items, cart entries) currently stored.
async fn row_counts(store: &Store) -> (u64, u64, u64) {
    let conn = &store.conn;
    (
        orders::Entity::find().count(conn).await.unwrap(),
        order_items::Entity::find().count(conn).await.unwrap(),
        cart_entries::Entity::find().count(conn).await.unwrap(),
    )
}

/// Makes every matching statement fail from now on.
async fn install_abort_trigger(store: &Store, name: &str, event: &str, condition: &str) {
    let sql = format!(
        "CREATE TRIGGER {name} BEFORE {event} FOR EACH ROW WHEN {condition} \
         BEGIN SELECT RAISE(ABORT, '{name}'); END"
    );
    store.conn.execute_unprepared(&sql).await.unwrap();
}

fn registration(username: &str, password: &str) -> Registration {
    Registration {
        name: format!("{username} name"),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
    }
}

#[tokio::test]
async fn test_add_twice_increments_quantity() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    let cart = &shop.state.cart_service;
    cart.add(&alice, shoe, 1).await.unwrap();
    cart.add(&alice, shoe, 1).await.unwrap();

    let summary = cart.list(&alice).await.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].quantity, 2);
    assert_eq!(summary.total, Price::from_stored(200_000));
}

#[tokio::test]
async fn test_concurrent_adds_do_not_lose_updates() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    let cart = &shop.state.cart_service;
    let adds = (0..4).map(|_| cart.add(&alice, shoe, 1));
    for result in futures::future::join_all(adds).await {
        result.unwrap();
    }

    let quantity = shop
        .store()
        .cart_quantity(alice.user_id.value(), shoe.value())
        .await
        .unwrap();
    assert_eq!(quantity, Some(4));
}

#[tokio::test]
async fn test_add_rejects_bad_input() {
    let shop = TestShop::new().await;
    let alice = shop.customer("alice").await;

    let cart = &shop.state.cart_service;
    assert!(matches!(
        cart.add(&alice, ProductId::new(999), 1).await,
        Err(CartError::NotFound(_))
    ));

    let admin = shop.admin("boss").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    assert!(matches!(
        cart.add(&alice, shoe, 0).await,
        Err(CartError::Validation(_))
    ));
}

#[tokio::test]
async fn test_set_quantity_zero_removes_entry() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    let boot = shop.product(&admin, "Jordan 1", 50.0).await;

    let cart = &shop.state.cart_service;
    cart.add(&alice, shoe, 3).await.unwrap();
    cart.add(&alice, boot, 1).await.unwrap();

    let total = cart.set_quantity(&alice, shoe, 5).await.unwrap();
    assert_eq!(total, Price::from_stored(550_000));

    let total = cart.set_quantity(&alice, shoe, 0).await.unwrap();
    assert_eq!(total, Price::from_stored(50_000));
    assert_eq!(
        shop.store()
            .cart_quantity(alice.user_id.value(), shoe.value())
            .await
            .unwrap(),
        None
    );

    // No entry: nothing happens.
    let total = cart.set_quantity(&alice, shoe, 2).await.unwrap();
    assert_eq!(total, Price::from_stored(50_000));

    cart.remove(&alice, boot).await.unwrap();
    assert!(cart.list(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let bob = shop.customer("bob").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    shop.state.cart_service.add(&alice, shoe, 2).await.unwrap();

    assert!(shop.state.cart_service.list(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_empty_cart_creates_nothing() {
    let shop = TestShop::new().await;
    let alice = shop.customer("alice").await;

    let checkout = &shop.state.checkout_service;
    assert!(matches!(
        checkout.checkout_summary(&alice).await,
        Err(CheckoutError::EmptyCart)
    ));
    assert!(matches!(
        checkout.checkout(&alice, "cash").await,
        Err(CheckoutError::EmptyCart)
    ));

    let count = orders::Entity::find()
        .count(&shop.store().conn)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_checkout_snapshots_prices_and_empties_cart() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    let boot = shop.product(&admin, "Jordan 1", 50.0).await;

    shop.state.cart_service.add(&alice, shoe, 2).await.unwrap();
    shop.state.cart_service.add(&alice, boot, 1).await.unwrap();

    let order = shop
        .state
        .checkout_service
        .checkout(&alice, "  Cash on delivery ")
        .await
        .unwrap();

    assert_eq!(order.total_amount, Price::from_stored(250_000));
    assert_eq!(order.total_amount.formatted(), "250VNĐ");
    assert_eq!(order.payment_method.as_deref(), Some("Cash on delivery"));
    assert_eq!(order.username, "alice");
    assert_eq!(order.items.len(), 2);

    let line_sum: Price = order.items.iter().map(|line| line.subtotal()).sum();
    assert_eq!(line_sum, order.total_amount);
    assert!(
        shop.state
            .cart_service
            .list(&alice)
            .await
            .unwrap()
            .is_empty()
    );

    // A later price change leaves the recorded line items alone.
    shop.state
        .admin_service
        .update_product(
            Some(&admin),
            shoe,
            ProductForm {
                name: "Air Max".to_string(),
                price: 999.0,
                description: None,
                category: "Nike".to_string(),
            },
        )
        .await
        .unwrap();

    let history = shop.state.checkout_service.order_history(&alice).await.unwrap();
    assert_eq!(history.len(), 1);
    let shoe_line = history[0]
        .items
        .iter()
        .find(|line| line.product_id == shoe)
        .unwrap();
    assert_eq!(shoe_line.unit_price, Price::from_stored(100_000));
    assert_eq!(history[0].total_amount, Price::from_stored(250_000));
}

#[tokio::test]
async fn test_checkout_rejects_long_payment_label() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();

    let label = "x".repeat(200);
    assert!(matches!(
        shop.state.checkout_service.checkout(&alice, &label).await,
        Err(CheckoutError::Validation(_))
    ));
    assert_eq!(
        shop.store()
            .cart_quantity(alice.user_id.value(), shoe.value())
            .await
            .unwrap(),
        Some(1)
    );
}

#[tokio::test]
async fn test_delete_product_cascades() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let bob = shop.customer("bob").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    let boot = shop.product(&admin, "Jordan 1", 50.0).await;

    // Three orders contain the shoe.
    for buyer in [&alice, &bob, &alice] {
        shop.state.cart_service.add(buyer, shoe, 1).await.unwrap();
        shop.state.cart_service.add(buyer, boot, 1).await.unwrap();
        shop.state.checkout_service.checkout(buyer, "").await.unwrap();
    }

    // Two carts hold it.
    shop.state.cart_service.add(&alice, shoe, 2).await.unwrap();
    shop.state.cart_service.add(&bob, shoe, 1).await.unwrap();

    shop.state
        .admin_service
        .add_secondary_image(Some(&admin), shoe, "side.png", b"\x89PNG")
        .await
        .unwrap();

    shop.state
        .admin_service
        .delete_product(Some(&admin), shoe)
        .await
        .unwrap();

    let conn = &shop.store().conn;
    let items = order_items::Entity::find()
        .filter(order_items::Column::ProductId.eq(shoe.value()))
        .count(conn)
        .await
        .unwrap();
    let entries = cart_entries::Entity::find()
        .filter(cart_entries::Column::ProductId.eq(shoe.value()))
        .count(conn)
        .await
        .unwrap();
    let images = product_images::Entity::find()
        .filter(product_images::Column::ProductId.eq(shoe.value()))
        .count(conn)
        .await
        .unwrap();
    assert_eq!((items, entries, images), (0, 0, 0));

    // Other products and the orders themselves survive.
    assert!(shop.store().get_product(boot.value()).await.unwrap().is_some());
    assert_eq!(shop.store().list_orders().await.unwrap().len(), 3);

    assert!(matches!(
        shop.state
            .admin_service
            .delete_product(Some(&admin), shoe)
            .await,
        Err(AdminError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_secondary_image_limit() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    let max = shop.state.config.catalog.max_secondary_images;

    let admin_service = &shop.state.admin_service;
    for _ in 0..max {
        admin_service
            .add_secondary_image(Some(&admin), shoe, "side.jpg", b"jpeg")
            .await
            .unwrap();
    }

    assert!(matches!(
        admin_service
            .add_secondary_image(Some(&admin), shoe, "side.jpg", b"jpeg")
            .await,
        Err(AdminError::Validation(_))
    ));

    let product = admin_service
        .clear_secondary_images(Some(&admin), shoe)
        .await
        .unwrap();
    assert!(product.images.is_empty());

    let leftover = std::fs::read_dir(shop.dir.join("images")).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_primary_image_replacement_removes_old_file() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    let admin_service = &shop.state.admin_service;
    let first = admin_service
        .set_primary_image(Some(&admin), shoe, "front.png", b"one")
        .await
        .unwrap()
        .image_url
        .unwrap();
    let second = admin_service
        .set_primary_image(Some(&admin), shoe, "front.png", b"two")
        .await
        .unwrap()
        .image_url
        .unwrap();

    assert_ne!(first, second);
    assert!(!shop.dir.join("images").join(&first).exists());
    assert!(shop.dir.join("images").join(&second).exists());

    assert!(matches!(
        admin_service
            .set_primary_image(Some(&admin), shoe, "front.gif", b"gif")
            .await,
        Err(AdminError::Validation(_))
    ));
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;

    assert!(matches!(
        shop.state
            .admin_service
            .delete_user(Some(&admin), admin.user_id)
            .await,
        Err(AdminError::SelfDeleteForbidden)
    ));

    let user = shop.store().get_user(admin.user_id.value()).await.unwrap();
    assert!(user.is_some_and(|u| u.is_admin));
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    shop.state.checkout_service.checkout(&alice, "").await.unwrap();
    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();

    shop.state
        .admin_service
        .delete_user(Some(&admin), alice.user_id)
        .await
        .unwrap();

    let conn = &shop.store().conn;
    assert_eq!(orders::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(order_items::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(cart_entries::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(
        users::Entity::find()
            .filter(users::Column::Username.eq("alice"))
            .count(conn)
            .await
            .unwrap(),
        0
    );

    // Dropped sessions resolve to nobody.
    assert!(
        shop.state
            .auth_service
            .principal_for(alice.user_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_delete_order_removes_items() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    let order = shop.state.checkout_service.checkout(&alice, "").await.unwrap();

    shop.state
        .admin_service
        .delete_order(Some(&admin), order.id)
        .await
        .unwrap();

    let conn = &shop.store().conn;
    assert_eq!(order_items::Entity::find().count(conn).await.unwrap(), 0);
    assert!(matches!(
        shop.state
            .admin_service
            .delete_order(Some(&admin), order.id)
            .await,
        Err(AdminError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_admin_operations_require_privilege() {
    let shop = TestShop::new().await;
    let alice = shop.customer("alice").await;
    let admin_service = &shop.state.admin_service;

    assert!(matches!(
        admin_service.dashboard(None).await,
        Err(AdminError::Forbidden)
    ));
    assert!(matches!(
        admin_service.list_users(Some(&alice)).await,
        Err(AdminError::Forbidden)
    ));
    assert!(matches!(
        admin_service.delete_product(Some(&alice), ProductId::new(1)).await,
        Err(AdminError::Forbidden)
    ));
}

#[tokio::test]
async fn test_update_user_rejects_taken_email() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    shop.customer("bob").await;

    let result = shop
        .state
        .admin_service
        .update_user(
            Some(&admin),
            alice.user_id,
            UserForm {
                name: "Alice".to_string(),
                email: "bob@example.com".to_string(),
                is_admin: false,
            },
        )
        .await;
    assert!(matches!(result, Err(AdminError::DuplicateEmail)));

    let promoted = shop
        .state
        .admin_service
        .update_user(
            Some(&admin),
            alice.user_id,
            UserForm {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                is_admin: true,
            },
        )
        .await
        .unwrap();
    assert!(promoted.is_admin);

    let principal = shop
        .state
        .auth_service
        .principal_for(alice.user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(principal.is_admin());
}

#[tokio::test]
async fn test_registration_rules() {
    let shop = TestShop::new().await;
    let auth = &shop.state.auth_service;

    let mut mismatch = registration("carol", "secret");
    mismatch.confirm_password = "other".to_string();
    assert!(matches!(
        auth.register(mismatch).await,
        Err(AuthError::PasswordMismatch)
    ));
    assert!(
        shop.store()
            .get_user_by_username("carol")
            .await
            .unwrap()
            .is_none()
    );

    let carol = auth.register(registration("carol", "secret")).await.unwrap();
    assert!(!carol.is_admin());

    assert!(matches!(
        auth.register(registration("carol", "secret")).await,
        Err(AuthError::DuplicateUsername)
    ));

    let mut same_email = registration("caroline", "secret");
    same_email.email = "carol@example.com".to_string();
    assert!(matches!(
        auth.register(same_email).await,
        Err(AuthError::DuplicateEmail)
    ));

    let mut bad_email = registration("dave", "secret");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        auth.register(bad_email).await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn test_authenticate() {
    let shop = TestShop::new().await;
    let alice = shop.customer("alice").await;
    let auth = &shop.state.auth_service;

    let principal = auth.authenticate("alice", "secret").await.unwrap();
    assert_eq!(principal, alice);

    assert!(matches!(
        auth.authenticate("alice", "wrong").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.authenticate("nobody", "secret").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_catalog_queries() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    shop.product(&admin, "Air Max 90", 100.0).await;
    shop.product(&admin, "Air Force 1", 80.0).await;
    let ultraboost = shop
        .state
        .admin_service
        .create_product(
            Some(&admin),
            ProductForm {
                name: "Ultraboost".to_string(),
                price: 150.0,
                description: Some("Running shoe".to_string()),
                category: "Adidas".to_string(),
            },
        )
        .await
        .unwrap();

    let catalog = &shop.state.catalog_service;
    assert_eq!(catalog.list_products().await.unwrap().len(), 3);
    assert_eq!(catalog.list_by_category("Adidas").await.unwrap().len(), 1);
    assert_eq!(catalog.search("air").await.unwrap().len(), 2);
    assert_eq!(catalog.search("").await.unwrap().len(), 3);
    assert_eq!(catalog.search("100%").await.unwrap().len(), 0);
    assert!(catalog.suggestions("").await.unwrap().is_empty());

    let suggestions = catalog.suggestions("boost").await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].price_display, "150VNĐ");

    let product = catalog.get_product(ultraboost.id).await.unwrap();
    assert_eq!(product.description.as_deref(), Some("Running shoe"));

    let rejected = shop
        .state
        .admin_service
        .create_product(
            Some(&admin),
            ProductForm {
                name: "Mystery".to_string(),
                price: 10.0,
                description: None,
                category: "Crocs".to_string(),
            },
        )
        .await;
    assert!(matches!(rejected, Err(AdminError::Validation(_))));
}

#[tokio::test]
async fn test_dashboard_and_export() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    for _ in 0..2 {
        shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
        shop.state.checkout_service.checkout(&alice, "").await.unwrap();
    }

    let dashboard = shop.state.admin_service.dashboard(Some(&admin)).await.unwrap();
    assert_eq!(dashboard.total_revenue, Price::from_stored(200_000));
    assert_eq!(dashboard.orders.len(), 2);
    assert_eq!(dashboard.revenue_by_day.len(), 1);

    let csv = shop
        .state
        .admin_service
        .export_orders(Some(&admin))
        .await
        .unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("order_id,username,total,order_date,products"));
    assert_eq!(lines.count(), 2);
}

#[tokio::test]
async fn test_add_refuses_quantity_overflow() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 1.0).await;

    let cart = &shop.state.cart_service;
    cart.add(&alice, shoe, i32::MAX).await.unwrap();

    assert!(matches!(
        cart.add(&alice, shoe, 1).await,
        Err(CartError::Validation(_))
    ));

    // The entry is untouched and the cart stays readable.
    let summary = cart.list(&alice).await.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].quantity, i32::MAX);
    assert_eq!(
        cart.total(&alice).await.unwrap(),
        Price::from_stored(1000).times(i32::MAX)
    );

    let order = shop.state.checkout_service.checkout(&alice, "").await.unwrap();
    assert_eq!(order.items[0].quantity, i32::MAX);
}

#[tokio::test]
async fn test_failed_checkout_writes_nothing() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    let boot = shop.product(&admin, "Jordan 1", 50.0).await;

    shop.state.cart_service.add(&alice, shoe, 2).await.unwrap();
    shop.state.cart_service.add(&alice, boot, 1).await.unwrap();

    // The first line item goes in, the second one fails.
    install_abort_trigger(
        shop.store(),
        "second_line_item",
        "INSERT ON order_items",
        "(SELECT COUNT(*) FROM order_items WHERE order_id = NEW.order_id) >= 1",
    )
    .await;

    assert!(matches!(
        shop.state.checkout_service.checkout(&alice, "Cash").await,
        Err(CheckoutError::StorageConflict(_))
    ));

    assert_eq!(row_counts(shop.store()).await, (0, 0, 2));
    assert_eq!(
        shop.state.cart_service.total(&alice).await.unwrap(),
        Price::from_stored(250_000)
    );
}

#[tokio::test]
async fn test_failed_product_delete_rolls_back() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    shop.state.checkout_service.checkout(&alice, "").await.unwrap();
    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    let image = shop
        .state
        .admin_service
        .add_secondary_image(Some(&admin), shoe, "side.png", b"png")
        .await
        .unwrap()
        .images
        .remove(0);

    install_abort_trigger(shop.store(), "keep_products", "DELETE ON products", "1").await;

    assert!(matches!(
        shop.state
            .admin_service
            .delete_product(Some(&admin), shoe)
            .await,
        Err(AdminError::StorageConflict(_))
    ));

    // Line items, cart entries, image rows and files are all still there.
    assert_eq!(row_counts(shop.store()).await, (1, 1, 1));
    let product = shop.store().get_product(shoe.value()).await.unwrap().unwrap();
    assert_eq!(product.images, vec![image.clone()]);
    assert!(shop.dir.join("images").join(&image).exists());
}

#[tokio::test]
async fn test_failed_user_delete_rolls_back() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    shop.state.checkout_service.checkout(&alice, "").await.unwrap();
    shop.state.cart_service.add(&alice, shoe, 3).await.unwrap();

    install_abort_trigger(shop.store(), "keep_users", "DELETE ON users", "1").await;

    assert!(matches!(
        shop.state
            .admin_service
            .delete_user(Some(&admin), alice.user_id)
            .await,
        Err(AdminError::StorageConflict(_))
    ));

    assert_eq!(row_counts(shop.store()).await, (1, 1, 1));
    assert!(
        shop.store()
            .get_user(alice.user_id.value())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_failed_order_delete_rolls_back() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;
    let boot = shop.product(&admin, "Jordan 1", 50.0).await;

    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    shop.state.cart_service.add(&alice, boot, 1).await.unwrap();
    let order = shop.state.checkout_service.checkout(&alice, "").await.unwrap();

    install_abort_trigger(shop.store(), "keep_orders", "DELETE ON orders", "1").await;

    assert!(matches!(
        shop.state
            .admin_service
            .delete_order(Some(&admin), order.id)
            .await,
        Err(AdminError::StorageConflict(_))
    ));

    assert_eq!(row_counts(shop.store()).await, (1, 2, 0));
}

#[tokio::test]
async fn test_order_detail_is_owner_only() {
    let shop = TestShop::new().await;
    let admin = shop.admin("boss").await;
    let alice = shop.customer("alice").await;
    let bob = shop.customer("bob").await;
    let shoe = shop.product(&admin, "Air Max", 100.0).await;

    shop.state.cart_service.add(&alice, shoe, 1).await.unwrap();
    let placed = shop.state.checkout_service.checkout(&alice, "").await.unwrap();

    let checkout = &shop.state.checkout_service;
    let fetched = checkout.get_order(&alice, placed.id).await.unwrap();
    assert_eq!(fetched.id, placed.id);
    assert_eq!(fetched.total_amount, Price::from_stored(100_000));
    assert_eq!(fetched.items.len(), 1);

    assert!(matches!(
        checkout.get_order(&bob, placed.id).await,
        Err(CheckoutError::NotFound(_))
    ));
    assert!(matches!(
        checkout.get_order(&alice, OrderId::new(999)).await,
        Err(CheckoutError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_store_ping() {
    let shop = TestShop::new().await;
    shop.store().ping().await.unwrap();
}
