//! Solidity-facing interface of the token.

use alloy_sol_types::sol;

sol! {
    /// EIP-712 primary type a holder signs to authorize a burn.
    #[derive(Debug, PartialEq, Eq)]
    struct Burn {
        address from;
        uint256 amount;
        uint256 nonce;
        uint256 deadline;
    }

    /// Token interface as seen by EVM callers.
    interface ITestToken {
        /// Emitted on mint (`from` = 0), burn (`to` = 0) and transfer.
        event Transfer(address indexed from, address indexed to, uint256 value);

        /// Emitted whenever the owner changes.
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function owner() external view returns (address);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function nonces(address owner) external view returns (uint256);
        function DOMAIN_SEPARATOR() external view returns (bytes32);

        /// ERC-5267 description of the signing domain.
        function eip712Domain() external view returns (
            bytes1 fields,
            string name,
            string version,
            uint256 chainId,
            address verifyingContract,
            bytes32 salt,
            uint256[] extensions
        );

        /// Owner-only mint.
        function mint(address to, uint256 amount) external;

        /// Burns from the caller's own balance.
        function burn(uint256 amount) external;

        /// Burns from `from` on the strength of its EIP-712 signature. Anyone may relay.
        function burnWithSig(
            address from,
            uint256 amount,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external;

        function transfer(address to, uint256 amount) external returns (bool);
        function transferOwnership(address newOwner) external;
        function renounceOwnership() external;
    }
}
