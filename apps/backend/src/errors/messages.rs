//! Message keys returned in `ApiResponse.message`.
//!
//! The frontend translates these keys, so the strings are part of the API
//! contract. Add new keys here rather than passing ad-hoc strings.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // Login and sessions
    InvalidEmailOrPassword,
    AccountLocked,
    TwoFactorCodeRequired,
    InvalidTwoFactorCode,
    InvalidToken,
    InactiveToken,
    TokenIsRequired,
    TokenIsInvalid,
    TokenRevoked,

    // Users
    UserNotFound,
    UserWithIdNotFound,
    UserWithEmailNotFound,
    EmailAlreadyInUse,
    AdminRoleNotAllowed,
    WeakPassword,
    UserRegistered,
    EmailNotAssociated,
    EmailConfirmationFailed,
    EmailConfirmed,
    InvalidPasswordResetToken,
    PasswordResetEmailSent,
    PasswordResetSuccessful,
    CurrentPasswordIncorrect,
    PasswordChanged,
    UserDeleted,
    UserLockedOut,
    SameEmail,
    EmailChanged,
    AccountLockedSuccessfully,
    AccountUnlockedSuccessfully,
    CashStatusUpdated,

    // Google
    GoogleLinked,
    GoogleLinkFailed,
    GoogleAlreadyLinked,
    GoogleNotLinked,
    InvalidGoogleToken,
    GoogleSignInDisabled,

    // OTP
    PhoneNotAssociated,
    InvalidOtp,
    OtpSent,

    // Mail
    FailedToSendEmail,
    EmailSent,

    // Lookups
    InvalidTableName,
    CreatedSuccessfully,
    ItemUpdated,
    ItemDeleted,
    ItemNotFound,
    ErrorCreating,
    ErrorUpdating,
    ErrorDeleting,
}

impl MessageKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEmailOrPassword => "InvalidEmailOrPassword",
            Self::AccountLocked => "AccountLockedPleaseTryAgainLater",
            Self::TwoFactorCodeRequired => "TwoFactorAuthenticationCodeRequired",
            Self::InvalidTwoFactorCode => "InvalidTwoFactorAuthenticationCode",
            Self::InvalidToken => "InvalidToken",
            Self::InactiveToken => "InactiveToken",
            Self::TokenIsRequired => "TokenIsRequired",
            Self::TokenIsInvalid => "TokenIsInvalid",
            Self::TokenRevoked => "TokenRevoked",

            Self::UserNotFound => "UserNotFound",
            Self::UserWithIdNotFound => "UserWithThisIdNotFound",
            Self::UserWithEmailNotFound => "UserWithThisemailNotFound",
            Self::EmailAlreadyInUse => "ThisEmailAddressIsAlreadyInUse",
            Self::AdminRoleNotAllowed => "AdminRoleCannotBeAssignedAtRegistration",
            Self::WeakPassword => "PasswordDoesNotMeetComplexityRequirements",
            Self::UserRegistered => "UserRegisteredSuccessfully",
            Self::EmailNotAssociated => "TheProvidedEmailAddressIsNotAssociatedWithAnyAccount",
            Self::EmailConfirmationFailed => {
                "EmailConfirmationFailedTheProvidedTokenIsEitherInvalidOrHasAlreadyBeenUsed"
            }
            Self::EmailConfirmed => "Email confirmed successfully.",
            Self::InvalidPasswordResetToken => "InvalidOrExpiredPasswordResetTokenForThisEmail",
            Self::PasswordResetEmailSent => "PasswordResetEmailSent",
            Self::PasswordResetSuccessful => "PasswordResetSuccessful",
            Self::CurrentPasswordIncorrect => "CurrentPasswordIsIncorrect",
            Self::PasswordChanged => "PasswordChangedSuccessfully",
            Self::UserDeleted => "UserDeletedSuccessfully",
            Self::UserLockedOut => "UserAccountIsLockedOut",
            Self::SameEmail => "TheNewEmailIsTheSameAsTheCurrentEmail",
            Self::EmailChanged => "EmailAddressChangedSuccessfully",
            Self::AccountLockedSuccessfully => "Useraccountlockedsuccessfully",
            Self::AccountUnlockedSuccessfully => "Useraccountunlockedsuccessfully",
            Self::CashStatusUpdated => "UserCashStatusUpdatedSuccessfully",

            Self::GoogleLinked => "YourAccountHasBeenSuccessfullyLinkedWithYourGoogleAccount",
            Self::GoogleLinkFailed => "FailedToLinkYourGoogleAccountWithYourExistingAccount",
            Self::GoogleAlreadyLinked => "YourAccountIsAlreadyLinkedWithYourGoogleAccount",
            Self::GoogleNotLinked => "Your Account Is Not Linked With Google",
            Self::InvalidGoogleToken => "InvalidGoogleToken",
            Self::GoogleSignInDisabled => "GoogleSignInIsNotConfigured",

            Self::PhoneNotAssociated => "TheProvidedPhoneNumberIsNotAssociatedWithAnyAccount",
            Self::InvalidOtp => "TheOtpYouEnteredIsIncorrectOrHasExpired",
            Self::OtpSent => "OtpSentSuccessfully",

            Self::FailedToSendEmail => "FailedToSendEmail",
            Self::EmailSent => "EmailSentSuccessfully",

            Self::InvalidTableName => "Invalid table name",
            Self::CreatedSuccessfully => "CreatedSuccessfully",
            Self::ItemUpdated => "ItemIsUpdatedSuccessfully",
            Self::ItemDeleted => "ItemIsDeletedSuccessfully",
            Self::ItemNotFound => "ItemWithThisIdIsn'tFound",
            Self::ErrorCreating => "ErrorCreating",
            Self::ErrorUpdating => "ErrorUpdatingWithThisId",
            Self::ErrorDeleting => "ErrorDeletingWithThisId",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MessageKey> for String {
    fn from(key: MessageKey) -> Self {
        key.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageKey;

    #[test]
    fn wire_strings_are_stable() {
        assert_eq!(MessageKey::ItemNotFound.as_str(), "ItemWithThisIdIsn'tFound");
        assert_eq!(
            MessageKey::AccountLockedSuccessfully.to_string(),
            "Useraccountlockedsuccessfully"
        );
        assert_eq!(
            String::from(MessageKey::GoogleNotLinked),
            "Your Account Is Not Linked With Google"
        );
    }
}
