mod test_scatter_basic;
