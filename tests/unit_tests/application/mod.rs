mod dispatcher_test;
