//! Library-level tests for the domain rules shared by the API.
//!
//! These run without a server or database: they exercise the cart
//! aggregate and the role policy exactly as the handlers use them.

use galeria_api::models::{Cart, CartError, Product};
use galeria_core::{CartId, ProductId, Role, UserId};

fn dec(s: &str) -> rust_decimal::Decimal {
    s.parse().expect("invalid decimal literal")
}

fn producto(id: i32, precio: &str, stock: i32) -> Product {
    Product {
        id: ProductId::new(id),
        nombre: format!("Producto {id}"),
        categoria: "pintura".to_owned(),
        stock,
        precio: dec(precio),
        imagen: String::new(),
        created_at: chrono::Utc::now(),
    }
}

// =============================================================================
// Cart aggregate across several products
// =============================================================================

#[test]
fn cart_total_tracks_mixed_products() {
    let mut cart = Cart::new(CartId::new(1), UserId::new(1));
    let mut cuadro = producto(1, "120000", 4);
    let mut escultura = producto(2, "350000", 2);

    cart.add_line(&mut cuadro, 2).expect("add cuadro");
    cart.add_line(&mut escultura, 1).expect("add escultura");

    assert_eq!(cart.total, dec("590000"));
    assert_eq!(cuadro.stock, 2);
    assert_eq!(escultura.stock, 1);

    cart.remove_line(&mut cuadro);
    assert_eq!(cart.total, dec("350000"));
    assert_eq!(cuadro.stock, 4);
}

#[test]
fn oversell_is_rejected_without_side_effects() {
    let mut cart = Cart::new(CartId::new(1), UserId::new(1));
    let mut escultura = producto(2, "350000", 2);

    let err = cart.add_line(&mut escultura, 3).expect_err("oversell");
    assert!(matches!(
        err,
        CartError::InsufficientStock {
            available: 2,
            requested: 3
        }
    ));
    assert!(cart.is_empty());
    assert_eq!(escultura.stock, 2);
}

// =============================================================================
// Role policy table
// =============================================================================

#[test]
fn role_policy_matches_endpoint_gating() {
    // (role, catalog admin, catalog update, user admin, orders, shopping)
    let table = [
        (Role::Administrador, true, true, true, true, false),
        (Role::Empleado, false, true, false, true, false),
        (Role::Cliente, false, false, false, false, true),
    ];

    for (rol, catalog, update, users, orders, shop) in table {
        assert_eq!(rol.can_administer_catalog(), catalog, "{rol} catalog");
        assert_eq!(rol.can_update_catalog(), update, "{rol} update");
        assert_eq!(rol.can_administer_users(), users, "{rol} users");
        assert_eq!(rol.can_manage_orders(), orders, "{rol} orders");
        assert_eq!(rol.can_shop(), shop, "{rol} shop");
    }
}
