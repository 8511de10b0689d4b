use super::SessionCart;

pub(crate) fn run(cart: &mut SessionCart) {
    cart.clear();
}
