pub(crate) mod in_mem;
