//! Definitions of the Solidity functions called on the proxy admin

use alloy_sol_types::sol;

sol! {
    function acceptProxy(address _implementation, address _proxy) external;
    function acceptProxyAndCall(address _implementation, address _proxy, bytes calldata _data) external;
}
