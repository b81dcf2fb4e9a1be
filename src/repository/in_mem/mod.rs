pub(super) mod price_index;
