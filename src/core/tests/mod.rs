mod coupling_manager_tests;
